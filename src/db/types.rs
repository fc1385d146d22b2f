//! Database-agnostic type mappings.
//!
//! This module provides utilities for mapping between database-specific types
//! and the dataset's [`ColumnKind`]s.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. Database-specific decoders handle the actual value extraction
//!
//! A typed decode that the driver rejects falls back to a dynamic decode of the
//! raw value, so a single odd cell never fails a whole export.

use crate::models::{ColumnKind, DatabaseType, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::error::BoxDynError;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueFormat, PgValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Decode, Row, Type, TypeInfo, ValueRef};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Date,
    DateTime,
    /// Timezone-aware timestamp, converted to UTC on decode.
    DateTimeTz,
    Time,
    TimeTz,
    Json,
    Uuid,
    Unknown,
}

impl TypeCategory {
    /// Dataset kind for this category. `None` when only the values can tell.
    pub fn column_kind(&self) -> Option<ColumnKind> {
        match self {
            Self::Integer => Some(ColumnKind::Integer),
            Self::Float => Some(ColumnKind::Float),
            Self::Boolean => Some(ColumnKind::Boolean),
            Self::Date => Some(ColumnKind::Date),
            Self::DateTime | Self::DateTimeTz => Some(ColumnKind::DateTime),
            Self::Binary => Some(ColumnKind::Binary),
            // Exact decimals, times, JSON and UUIDs travel as text
            Self::Text | Self::Decimal | Self::Time | Self::TimeTz | Self::Json | Self::Uuid => {
                Some(ColumnKind::Text)
            }
            Self::Unknown => None,
        }
    }
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str, db: DatabaseType) -> TypeCategory {
    let lower = type_name.trim().to_lowercase();
    let lower = lower.trim_end_matches(" unsigned");

    // Arrays are kept as raw values
    if lower.ends_with("[]") {
        return TypeCategory::Unknown;
    }

    match lower {
        "date" => return TypeCategory::Date,
        "datetime" | "timestamp" => return TypeCategory::DateTime,
        "timestamptz" => return TypeCategory::DateTimeTz,
        "time" => return TypeCategory::Time,
        "timetz" => return TypeCategory::TimeTz,
        "bool" | "boolean" => return TypeCategory::Boolean,
        "json" | "jsonb" => return TypeCategory::Json,
        "uuid" => return TypeCategory::Uuid,
        "real" | "float" | "float4" | "float8" | "double" | "double precision" => {
            return TypeCategory::Float;
        }
        // Would otherwise match the "int" check below
        "interval" => return TypeCategory::Unknown,
        _ => {}
    }

    if lower.contains("point") {
        return TypeCategory::Unknown;
    }

    // Decimal/Numeric
    if lower.contains("decimal") || lower.contains("numeric") {
        // SQLite's NUMERIC is actually a float
        if db == DatabaseType::SQLite {
            return TypeCategory::Float;
        }
        return TypeCategory::Decimal;
    }

    // Integer types
    if lower.contains("int") || lower.contains("serial") {
        return TypeCategory::Integer;
    }

    // Binary types
    if lower.contains("blob") || lower.contains("binary") || lower == "bytea" {
        return TypeCategory::Binary;
    }

    if lower.contains("char")
        || lower.contains("text")
        || lower.contains("clob")
        || lower == "name"
        || lower == "enum"
    {
        return TypeCategory::Text;
    }

    TypeCategory::Unknown
}

/// Name and category of each column, from a row or a statement description.
pub fn column_categories<C: Column>(columns: &[C], db: DatabaseType) -> Vec<(String, TypeCategory)> {
    columns
        .iter()
        .map(|col| {
            (
                col.name().to_string(),
                categorize_type(col.type_info().name(), db),
            )
        })
        .collect()
}

/// Column type used when creating a table for a dataset column.
pub fn ddl_type(db: DatabaseType, kind: ColumnKind) -> &'static str {
    match (db, kind) {
        (DatabaseType::SQLite, ColumnKind::Integer) => "INTEGER",
        (DatabaseType::SQLite, ColumnKind::Float) => "REAL",
        (DatabaseType::SQLite, ColumnKind::DateTime) => "DATETIME",
        (DatabaseType::SQLite, ColumnKind::Binary) => "BLOB",

        (DatabaseType::PostgreSQL, ColumnKind::Integer) => "BIGINT",
        (DatabaseType::PostgreSQL, ColumnKind::Float) => "DOUBLE PRECISION",
        (DatabaseType::PostgreSQL, ColumnKind::DateTime) => "TIMESTAMP",
        (DatabaseType::PostgreSQL, ColumnKind::Binary) => "BYTEA",

        (DatabaseType::MySQL, ColumnKind::Integer) => "BIGINT",
        (DatabaseType::MySQL, ColumnKind::Float) => "DOUBLE",
        (DatabaseType::MySQL, ColumnKind::DateTime) => "DATETIME(6)",
        (DatabaseType::MySQL, ColumnKind::Binary) => "LONGBLOB",

        (_, ColumnKind::Boolean) => "BOOLEAN",
        (_, ColumnKind::Date) => "DATE",
        (_, ColumnKind::Text) => "TEXT",
    }
}

const TIME_FORMAT: &str = "%H:%M:%S%.f";

fn time_text(time: NaiveTime) -> Value {
    Value::Text(time.format(TIME_FORMAT).to_string())
}

// =============================================================================
// Decimal and UUID Support
// =============================================================================

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("NUMERIC")
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        match value.format() {
            PgValueFormat::Text => Ok(RawDecimal(value.as_str()?.to_string())),
            PgValueFormat::Binary => pg_numeric_to_string(value.as_bytes()?).map(RawDecimal),
        }
    }
}

/// Render the binary wire form of a PostgreSQL NUMERIC as exact decimal text.
///
/// Layout: ndigits, weight, sign, dscale (each 16 bit), then `ndigits` base-10000
/// digits. `weight` is the power of 10000 of the first digit.
fn pg_numeric_to_string(buf: &[u8]) -> Result<String, BoxDynError> {
    const SIGN_NEG: u16 = 0x4000;
    const SIGN_NAN: u16 = 0xC000;
    const SIGN_PINF: u16 = 0xD000;
    const SIGN_NINF: u16 = 0xF000;

    let read = |at: usize| -> Result<[u8; 2], BoxDynError> {
        buf.get(at..at + 2)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| "truncated NUMERIC value".into())
    };

    let ndigits = i16::from_be_bytes(read(0)?);
    let weight = i16::from_be_bytes(read(2)?) as i64;
    let sign = u16::from_be_bytes(read(4)?);
    let dscale = u16::from_be_bytes(read(6)?) as usize;

    match sign {
        SIGN_NAN => return Ok("NaN".to_string()),
        SIGN_PINF => return Ok("Infinity".to_string()),
        SIGN_NINF => return Ok("-Infinity".to_string()),
        _ => {}
    }

    let digits = (0..ndigits.max(0) as usize)
        .map(|i| read(8 + i * 2).map(i16::from_be_bytes))
        .collect::<Result<Vec<_>, _>>()?;
    let digit_at = |idx: i64| -> i16 {
        usize::try_from(idx)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == SIGN_NEG {
        out.push('-');
    }

    if weight < 0 {
        out.push('0');
    } else {
        for group in 0..=weight {
            let d = digit_at(group);
            if group == 0 {
                out.push_str(&d.to_string());
            } else {
                out.push_str(&format!("{:04}", d));
            }
        }
    }

    if dscale > 0 {
        let mut frac = String::new();
        let groups = dscale.div_ceil(4) as i64;
        for j in 1..=groups {
            frac.push_str(&format!("{:04}", digit_at(weight + j)));
        }
        frac.truncate(dscale);
        out.push('.');
        out.push_str(&frac);
    }

    Ok(out)
}

/// PostgreSQL UUID rendered in its canonical hyphenated form.
#[derive(Debug)]
pub struct RawUuid(pub String);

impl Type<sqlx::Postgres> for RawUuid {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("UUID")
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        ty.name().eq_ignore_ascii_case("uuid")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawUuid {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        match value.format() {
            PgValueFormat::Text => Ok(RawUuid(value.as_str()?.to_string())),
            PgValueFormat::Binary => format_uuid(value.as_bytes()?).map(RawUuid),
        }
    }
}

fn format_uuid(bytes: &[u8]) -> Result<String, BoxDynError> {
    if bytes.len() != 16 {
        return Err(format!("expected 16 bytes for UUID, got {}", bytes.len()).into());
    }
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}

// =============================================================================
// Row to Values Trait
// =============================================================================

/// Trait for converting database rows to dataset values.
pub trait RowToValues {
    /// Decode every column; `categories[i]` describes column `i`.
    fn to_values(&self, categories: &[TypeCategory]) -> Result<Vec<Value>, sqlx::Error>;
}

impl RowToValues for MySqlRow {
    fn to_values(&self, categories: &[TypeCategory]) -> Result<Vec<Value>, sqlx::Error> {
        categories
            .iter()
            .enumerate()
            .map(|(idx, category)| mysql::decode_column(self, idx, *category))
            .collect()
    }
}

impl RowToValues for PgRow {
    fn to_values(&self, categories: &[TypeCategory]) -> Result<Vec<Value>, sqlx::Error> {
        categories
            .iter()
            .enumerate()
            .map(|(idx, category)| postgres::decode_column(self, idx, *category))
            .collect()
    }
}

impl RowToValues for SqliteRow {
    fn to_values(&self, categories: &[TypeCategory]) -> Result<Vec<Value>, sqlx::Error> {
        categories
            .iter()
            .enumerate()
            .map(|(idx, category)| sqlite::decode_column(self, idx, *category))
            .collect()
    }
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod mysql {
    use super::*;

    pub fn decode_column(
        row: &MySqlRow,
        idx: usize,
        category: TypeCategory,
    ) -> Result<Value, sqlx::Error> {
        let typed: Result<Value, sqlx::Error> = match category {
            TypeCategory::Decimal => row
                .try_get::<Option<RawDecimal>, _>(idx)
                .map(|v| v.map(|d| d.0).into()),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => row.try_get::<Option<bool>, _>(idx).map(Value::from),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Binary => row.try_get::<Option<Vec<u8>>, _>(idx).map(bytes),
            TypeCategory::Date => row.try_get::<Option<NaiveDate>, _>(idx).map(Value::from),
            TypeCategory::DateTime | TypeCategory::DateTimeTz => {
                row.try_get::<Option<NaiveDateTime>, _>(idx).map(Value::from)
            }
            TypeCategory::Time | TypeCategory::TimeTz => row
                .try_get::<Option<NaiveTime>, _>(idx)
                .map(|v| v.map_or(Value::Null, time_text)),
            TypeCategory::Json => row
                .try_get::<Option<serde_json::Value>, _>(idx)
                .map(|v| v.map(|j| j.to_string()).into()),
            TypeCategory::Text | TypeCategory::Uuid | TypeCategory::Unknown => {
                return decode_dynamic(row, idx);
            }
        };
        typed.or_else(|_| decode_dynamic(row, idx))
    }

    fn decode_integer(row: &MySqlRow, idx: usize) -> Result<Value, sqlx::Error> {
        if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
            return Ok(v.into());
        }
        // BIGINT UNSIGNED above i64::MAX is kept as text
        row.try_get::<Option<u64>, _>(idx).map(|v| match v {
            None => Value::Null,
            Some(n) => i64::try_from(n).map_or_else(|_| Value::Text(n.to_string()), Value::Int),
        })
    }

    fn decode_float(row: &MySqlRow, idx: usize) -> Result<Value, sqlx::Error> {
        if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
            return Ok(v.into());
        }
        row.try_get::<Option<f32>, _>(idx)
            .map(|v| v.map(f64::from).into())
    }

    fn decode_dynamic(row: &MySqlRow, idx: usize) -> Result<Value, sqlx::Error> {
        if row.try_get_raw(idx)?.is_null() {
            return Ok(Value::Null);
        }
        if let Ok(v) = row.try_get::<String, _>(idx) {
            return Ok(Value::Text(v));
        }
        if let Ok(v) = row.try_get::<i64, _>(idx) {
            return Ok(Value::Int(v));
        }
        if let Ok(v) = row.try_get::<f64, _>(idx) {
            return Ok(Value::Float(v));
        }
        let raw = row.try_get::<Vec<u8>, _>(idx)?;
        Ok(utf8_or_bytes(raw))
    }
}

mod postgres {
    use super::*;

    pub fn decode_column(
        row: &PgRow,
        idx: usize,
        category: TypeCategory,
    ) -> Result<Value, sqlx::Error> {
        let typed: Result<Value, sqlx::Error> = match category {
            TypeCategory::Decimal => row
                .try_get::<Option<RawDecimal>, _>(idx)
                .map(|v| v.map(|d| d.0).into()),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => row.try_get::<Option<bool>, _>(idx).map(Value::from),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Binary => row.try_get::<Option<Vec<u8>>, _>(idx).map(bytes),
            TypeCategory::Date => row.try_get::<Option<NaiveDate>, _>(idx).map(Value::from),
            TypeCategory::DateTime => {
                row.try_get::<Option<NaiveDateTime>, _>(idx).map(Value::from)
            }
            TypeCategory::DateTimeTz => row
                .try_get::<Option<DateTime<Utc>>, _>(idx)
                .map(|v| v.map(|dt| dt.naive_utc()).into()),
            TypeCategory::Time => row
                .try_get::<Option<NaiveTime>, _>(idx)
                .map(|v| v.map_or(Value::Null, time_text)),
            TypeCategory::Json => row
                .try_get::<Option<serde_json::Value>, _>(idx)
                .map(|v| v.map(|j| j.to_string()).into()),
            TypeCategory::Uuid => row
                .try_get::<Option<RawUuid>, _>(idx)
                .map(|v| v.map(|u| u.0).into()),
            TypeCategory::Text => row.try_get::<Option<String>, _>(idx).map(Value::from),
            TypeCategory::TimeTz | TypeCategory::Unknown => return decode_raw(row, idx),
        };
        typed.or_else(|_| decode_raw(row, idx))
    }

    fn decode_integer(row: &PgRow, idx: usize) -> Result<Value, sqlx::Error> {
        if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
            return Ok(v.into());
        }
        if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
            return Ok(v.map(i64::from).into());
        }
        row.try_get::<Option<i16>, _>(idx)
            .map(|v| v.map(i64::from).into())
    }

    fn decode_float(row: &PgRow, idx: usize) -> Result<Value, sqlx::Error> {
        if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
            return Ok(v.into());
        }
        row.try_get::<Option<f32>, _>(idx)
            .map(|v| v.map(f64::from).into())
    }

    /// Text-format values are taken as-is; binary ones as UTF-8 when valid.
    fn decode_raw(row: &PgRow, idx: usize) -> Result<Value, sqlx::Error> {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        match raw.format() {
            PgValueFormat::Text => raw
                .as_str()
                .map(|s| Value::Text(s.to_string()))
                .map_err(sqlx::Error::Decode),
            PgValueFormat::Binary => raw
                .as_bytes()
                .map(|b| utf8_or_bytes(b.to_vec()))
                .map_err(sqlx::Error::Decode),
        }
    }
}

mod sqlite {
    use super::*;

    pub fn decode_column(
        row: &SqliteRow,
        idx: usize,
        category: TypeCategory,
    ) -> Result<Value, sqlx::Error> {
        let typed: Result<Value, sqlx::Error> = match category {
            TypeCategory::Integer => row.try_get::<Option<i64>, _>(idx).map(Value::from),
            TypeCategory::Boolean => row.try_get::<Option<bool>, _>(idx).map(Value::from),
            TypeCategory::Float | TypeCategory::Decimal => {
                row.try_get::<Option<f64>, _>(idx).map(Value::from)
            }
            TypeCategory::Binary => row.try_get::<Option<Vec<u8>>, _>(idx).map(bytes),
            TypeCategory::Date => row.try_get::<Option<NaiveDate>, _>(idx).map(Value::from),
            TypeCategory::DateTime | TypeCategory::DateTimeTz => {
                row.try_get::<Option<NaiveDateTime>, _>(idx).map(Value::from)
            }
            TypeCategory::Text => row.try_get::<Option<String>, _>(idx).map(Value::from),
            _ => return decode_dynamic(row, idx),
        };
        // SQLite columns may hold any storage class regardless of declared type
        typed.or_else(|_| decode_dynamic(row, idx))
    }

    /// Decode by the value's runtime storage class.
    fn decode_dynamic(row: &SqliteRow, idx: usize) -> Result<Value, sqlx::Error> {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        let storage = raw.type_info().name().to_string();
        match storage.as_str() {
            "INTEGER" => row.try_get::<i64, _>(idx).map(Value::Int),
            "REAL" => row.try_get::<f64, _>(idx).map(Value::Float),
            "BLOB" => row.try_get::<Vec<u8>, _>(idx).map(Value::Bytes),
            _ => row.try_get_unchecked::<String, _>(idx).map(Value::Text),
        }
    }
}

fn bytes(v: Option<Vec<u8>>) -> Value {
    v.map_or(Value::Null, Value::Bytes)
}

fn utf8_or_bytes(raw: Vec<u8>) -> Value {
    match String::from_utf8(raw) {
        Ok(s) => Value::Text(s),
        Err(e) => Value::Bytes(e.into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(ndigits: i16, weight: i16, sign: u16, dscale: u16, digits: &[i16]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&ndigits.to_be_bytes());
        buf.extend_from_slice(&weight.to_be_bytes());
        buf.extend_from_slice(&sign.to_be_bytes());
        buf.extend_from_slice(&dscale.to_be_bytes());
        for d in digits {
            buf.extend_from_slice(&d.to_be_bytes());
        }
        buf
    }

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(
            categorize_type("INT", DatabaseType::MySQL),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("BIGINT UNSIGNED", DatabaseType::MySQL),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("INT8", DatabaseType::PostgreSQL),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("INTEGER", DatabaseType::SQLite),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("INTERVAL", DatabaseType::PostgreSQL),
            TypeCategory::Unknown
        );
        assert_eq!(
            categorize_type("INT4[]", DatabaseType::PostgreSQL),
            TypeCategory::Unknown
        );
    }

    #[test]
    fn test_categorize_type_decimal() {
        assert_eq!(
            categorize_type("DECIMAL", DatabaseType::MySQL),
            TypeCategory::Decimal
        );
        assert_eq!(
            categorize_type("NUMERIC", DatabaseType::PostgreSQL),
            TypeCategory::Decimal
        );
        // SQLite NUMERIC is a float
        assert_eq!(
            categorize_type("NUMERIC", DatabaseType::SQLite),
            TypeCategory::Float
        );
    }

    #[test]
    fn test_categorize_type_temporal() {
        assert_eq!(
            categorize_type("DATE", DatabaseType::SQLite),
            TypeCategory::Date
        );
        assert_eq!(
            categorize_type("DATETIME", DatabaseType::MySQL),
            TypeCategory::DateTime
        );
        assert_eq!(
            categorize_type("TIMESTAMPTZ", DatabaseType::PostgreSQL),
            TypeCategory::DateTimeTz
        );
        assert_eq!(
            categorize_type("TIME", DatabaseType::PostgreSQL),
            TypeCategory::Time
        );
    }

    #[test]
    fn test_categorize_type_text_and_binary() {
        assert_eq!(
            categorize_type("VARCHAR", DatabaseType::MySQL),
            TypeCategory::Text
        );
        assert_eq!(
            categorize_type("BPCHAR", DatabaseType::PostgreSQL),
            TypeCategory::Text
        );
        assert_eq!(
            categorize_type("BYTEA", DatabaseType::PostgreSQL),
            TypeCategory::Binary
        );
        assert_eq!(
            categorize_type("BLOB", DatabaseType::SQLite),
            TypeCategory::Binary
        );
        assert_eq!(
            categorize_type("NULL", DatabaseType::SQLite),
            TypeCategory::Unknown
        );
    }

    #[test]
    fn test_category_kinds() {
        assert_eq!(TypeCategory::Decimal.column_kind(), Some(ColumnKind::Text));
        assert_eq!(
            TypeCategory::DateTimeTz.column_kind(),
            Some(ColumnKind::DateTime)
        );
        assert_eq!(TypeCategory::Unknown.column_kind(), None);
    }

    #[test]
    fn test_ddl_types() {
        assert_eq!(ddl_type(DatabaseType::SQLite, ColumnKind::Integer), "INTEGER");
        assert_eq!(
            ddl_type(DatabaseType::PostgreSQL, ColumnKind::Float),
            "DOUBLE PRECISION"
        );
        assert_eq!(
            ddl_type(DatabaseType::MySQL, ColumnKind::DateTime),
            "DATETIME(6)"
        );
        assert_eq!(ddl_type(DatabaseType::MySQL, ColumnKind::Date), "DATE");
    }

    #[test]
    fn test_pg_numeric_decimal_places() {
        // 123.45
        let buf = numeric(2, 0, 0, 2, &[123, 4500]);
        assert_eq!(pg_numeric_to_string(&buf).unwrap(), "123.45");

        // -0.05
        let buf = numeric(1, -1, 0x4000, 2, &[500]);
        assert_eq!(pg_numeric_to_string(&buf).unwrap(), "-0.05");

        // 0.00012340 (weight -1: first digit is the 1e-4 group)
        let buf = numeric(2, -1, 0, 8, &[1, 2340]);
        assert_eq!(pg_numeric_to_string(&buf).unwrap(), "0.00012340");
    }

    #[test]
    fn test_pg_numeric_trailing_zero_groups() {
        // 10000 stored as a single digit with weight 1
        let buf = numeric(1, 1, 0, 0, &[1]);
        assert_eq!(pg_numeric_to_string(&buf).unwrap(), "10000");

        // 12345678.9
        let buf = numeric(3, 1, 0, 1, &[1234, 5678, 9000]);
        assert_eq!(pg_numeric_to_string(&buf).unwrap(), "12345678.9");

        // zero with scale
        let buf = numeric(0, 0, 0, 2, &[]);
        assert_eq!(pg_numeric_to_string(&buf).unwrap(), "0.00");
    }

    #[test]
    fn test_pg_numeric_special_values() {
        assert_eq!(
            pg_numeric_to_string(&numeric(0, 0, 0xC000, 0, &[])).unwrap(),
            "NaN"
        );
        assert!(pg_numeric_to_string(&[0, 1]).is_err());
        // Declares two digits but carries one
        assert!(pg_numeric_to_string(&numeric(2, 0, 0, 0, &[1])).is_err());
    }

    #[test]
    fn test_format_uuid() {
        let bytes: Vec<u8> = (0u8..16).collect();
        assert_eq!(
            format_uuid(&bytes).unwrap(),
            "00010203-0405-0607-0809-0a0b0c0d0e0f"
        );
        assert!(format_uuid(&bytes[..4]).is_err());
    }

    #[test]
    fn test_utf8_or_bytes() {
        assert_eq!(utf8_or_bytes(b"abc".to_vec()), Value::Text("abc".into()));
        assert_eq!(
            utf8_or_bytes(vec![0xFF, 0xFE]),
            Value::Bytes(vec![0xFF, 0xFE])
        );
    }
}
