//! In-memory tabular data.
//!
//! A [`Dataset`] is the exchange format between loading, querying and exporting:
//! an ordered list of named, typed columns plus rows of scalar [`Value`]s. Every
//! row has exactly one value per column, and column and row order are kept as
//! given.

use crate::error::{EtlError, EtlResult};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Date format used for CSV fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Datetime format used for CSV fields. Fractional seconds are optional on input.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const DATETIME_FORMAT_SPACE: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The column kind this value naturally belongs to. `None` for null.
    pub fn kind(&self) -> Option<ColumnKind> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ColumnKind::Boolean),
            Self::Int(_) => Some(ColumnKind::Integer),
            Self::Float(_) => Some(ColumnKind::Float),
            Self::Date(_) => Some(ColumnKind::Date),
            Self::DateTime(_) => Some(ColumnKind::DateTime),
            Self::Text(_) => Some(ColumnKind::Text),
            Self::Bytes(_) => Some(ColumnKind::Binary),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Encode this value as a delimited-file field.
    ///
    /// Null becomes the empty string. Floats always carry a decimal point or an
    /// exponent so that they read back as floats.
    pub fn to_field(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => format!("{:?}", v),
            Self::Date(v) => v.format(DATE_FORMAT).to_string(),
            Self::DateTime(v) => v.format(DATETIME_FORMAT).to_string(),
            Self::Text(v) => v.clone(),
            Self::Bytes(v) => STANDARD.encode(v),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            other => f.write_str(&other.to_field()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Logical column type shared by all backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Text,
    Binary,
}

/// Kinds tried, in order, when inferring a column from text fields.
const INFERENCE_ORDER: [ColumnKind; 5] = [
    ColumnKind::Integer,
    ColumnKind::Float,
    ColumnKind::Boolean,
    ColumnKind::Date,
    ColumnKind::DateTime,
];

impl ColumnKind {
    /// Infer the narrowest kind every non-empty field parses as.
    ///
    /// An all-empty column is text.
    pub fn infer<'a, I>(fields: I) -> ColumnKind
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: Clone,
    {
        let fields = fields.into_iter().filter(|f| !f.is_empty());
        if fields.clone().next().is_none() {
            return ColumnKind::Text;
        }
        INFERENCE_ORDER
            .into_iter()
            .find(|kind| fields.clone().all(|f| kind.parse_field(f).is_some()))
            .unwrap_or(ColumnKind::Text)
    }

    /// Kind describing a column of already-typed values.
    ///
    /// Integers mixed with floats widen to float; any other mix is text.
    pub fn of_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> ColumnKind {
        let mut kinds = values.into_iter().filter_map(Value::kind);
        let Some(first) = kinds.next() else {
            return ColumnKind::Text;
        };
        kinds.fold(first, |acc, kind| match (acc, kind) {
            (a, b) if a == b => a,
            (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Text,
        })
    }

    /// Parse a text field as this kind. Empty fields are null.
    ///
    /// Returns `None` if the field is not a valid value of this kind.
    pub fn parse_field(&self, raw: &str) -> Option<Value> {
        if raw.is_empty() {
            return Some(Value::Null);
        }
        let field = raw.trim();
        match self {
            Self::Integer => field.parse::<i64>().ok().map(Value::Int),
            Self::Float => {
                // Rejects "inf" and "NaN", which f64 parsing would otherwise accept
                if !field.bytes().any(|b| b.is_ascii_digit()) {
                    return None;
                }
                // Integers too wide for i64 stay text rather than lose digits
                let unsigned = field.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(field);
                if unsigned.bytes().all(|b| b.is_ascii_digit()) && field.parse::<i64>().is_err() {
                    return None;
                }
                field
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Value::Float)
            }
            Self::Boolean => {
                if field.eq_ignore_ascii_case("true") {
                    Some(Value::Bool(true))
                } else if field.eq_ignore_ascii_case("false") {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
            Self::Date => NaiveDate::parse_from_str(field, DATE_FORMAT)
                .ok()
                .map(Value::Date),
            Self::DateTime => NaiveDateTime::parse_from_str(field, DATETIME_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(field, DATETIME_FORMAT_SPACE))
                .ok()
                .map(Value::DateTime),
            Self::Text => Some(Value::Text(raw.to_string())),
            Self::Binary => STANDARD.decode(field).ok().map(Value::Bytes),
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Text => "text",
            Self::Binary => "binary",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Zero rows and zero columns. What a failed query yields.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A dataset with the given columns and no rows yet.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> EtlResult<Self> {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Build a dataset from raw text records, inferring each column's kind.
    ///
    /// Empty header names become `column_<n>` (1-based); repeated names are
    /// renamed as by [`unique_column_names`].
    pub fn from_text_records(headers: Vec<String>, records: Vec<Vec<String>>) -> EtlResult<Self> {
        let headers = unique_column_names(headers.into_iter().enumerate().map(|(idx, name)| {
            let name = name.trim().to_string();
            if name.is_empty() {
                format!("column_{}", idx + 1)
            } else {
                name
            }
        }));

        for (line, record) in records.iter().enumerate() {
            if record.len() != headers.len() {
                return Err(EtlError::invalid_input(format!(
                    "Record {} has {} fields, expected {}",
                    line + 1,
                    record.len(),
                    headers.len()
                )));
            }
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let kind = ColumnKind::infer(records.iter().map(|r| r[idx].as_str()));
                Column::new(name, kind)
            })
            .collect();

        let mut rows = Vec::with_capacity(records.len());
        for (line, record) in records.iter().enumerate() {
            let row = record
                .iter()
                .zip(&columns)
                .map(|(field, column)| {
                    column.kind.parse_field(field).ok_or_else(|| {
                        EtlError::invalid_input(format!(
                            "Record {}: '{}' is not a valid {} for column '{}'",
                            line + 1,
                            field,
                            column.kind,
                            column.name
                        ))
                    })
                })
                .collect::<EtlResult<Vec<_>>>()?;
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Append a row. Its length must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> EtlResult<()> {
        if row.len() != self.columns.len() {
            return Err(EtlError::invalid_input(format!(
                "Row has {} values, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the dataset has no rows (it may still have columns).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Consume the dataset, yielding its columns and rows.
    pub fn into_parts(self) -> (Vec<Column>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}

/// Make column names distinct: a repeated `name` becomes `name.1`, `name.2`
/// and so on, skipping suffixes already in use.
///
/// Names are compared case-insensitively, as SQL identifiers usually are.
pub fn unique_column_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut taken = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            let mut candidate = name.clone();
            let mut suffix = 0;
            while !taken.insert(candidate.to_lowercase()) {
                suffix += 1;
                candidate = format!("{}.{}", name, suffix);
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(fields: &[&str]) -> ColumnKind {
        ColumnKind::infer(fields.iter().copied())
    }

    #[test]
    fn test_infer_kinds() {
        assert_eq!(infer(&["1", "-2", "30"]), ColumnKind::Integer);
        assert_eq!(infer(&["1", "2.5", ""]), ColumnKind::Float);
        assert_eq!(infer(&["1e3", "4"]), ColumnKind::Float);
        assert_eq!(infer(&["TRUE", "false"]), ColumnKind::Boolean);
        assert_eq!(infer(&["2024-01-31", ""]), ColumnKind::Date);
        assert_eq!(
            infer(&["2024-01-31T10:00:00", "2024-02-01 08:30:15.250"]),
            ColumnKind::DateTime
        );
        assert_eq!(infer(&["2024-01-31", "2024-01-31T10:00:00"]), ColumnKind::Text);
        assert_eq!(infer(&["1", "abc"]), ColumnKind::Text);
        assert_eq!(infer(&["", ""]), ColumnKind::Text);
        assert_eq!(infer(&[]), ColumnKind::Text);
    }

    #[test]
    fn test_nan_and_inf_are_text() {
        assert_eq!(infer(&["NaN", "inf"]), ColumnKind::Text);
    }

    #[test]
    fn test_overflowing_numbers_are_text() {
        assert_eq!(infer(&["1e400"]), ColumnKind::Text);
        assert_eq!(infer(&["1.5", "-1e400"]), ColumnKind::Text);
        assert_eq!(ColumnKind::Float.parse_field("1e400"), None);

        // Wider than i64: keep every digit as text instead of rounding to a float
        assert_eq!(infer(&["12345678901234567890123"]), ColumnKind::Text);
        assert_eq!(infer(&["1", "-99999999999999999999"]), ColumnKind::Text);
        assert_eq!(ColumnKind::Float.parse_field("+12345678901234567890123"), None);

        // Still floats when written as floats
        assert_eq!(infer(&["12345678901234567890123.0"]), ColumnKind::Float);
        assert_eq!(infer(&["9223372036854775807", "0.5"]), ColumnKind::Float);
    }

    #[test]
    fn test_empty_text_reads_back_as_null() {
        let field = Value::from("").to_field();
        assert_eq!(field, "");
        assert_eq!(ColumnKind::Text.parse_field(&field), Some(Value::Null));
    }

    #[test]
    fn test_of_values_widens_ints() {
        let values = [Value::Int(1), Value::Null, Value::Float(2.5)];
        assert_eq!(ColumnKind::of_values(&values), ColumnKind::Float);

        let values = [Value::Int(1), Value::Text("x".into())];
        assert_eq!(ColumnKind::of_values(&values), ColumnKind::Text);

        assert_eq!(ColumnKind::of_values(&[Value::Null]), ColumnKind::Text);
    }

    #[test]
    fn test_to_field_encoding() {
        assert_eq!(Value::Null.to_field(), "");
        assert_eq!(Value::Bool(true).to_field(), "true");
        assert_eq!(Value::Int(-42).to_field(), "-42");
        assert_eq!(Value::Float(3.0).to_field(), "3.0");
        assert_eq!(Value::Float(0.1).to_field(), "0.1");
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::Date(date).to_field(), "2024-02-29");
        let dt = date.and_hms_milli_opt(13, 5, 9, 120).unwrap();
        assert_eq!(Value::DateTime(dt).to_field(), "2024-02-29T13:05:09.120");
        assert_eq!(Value::Bytes(b"hello".to_vec()).to_field(), "aGVsbG8=");
    }

    #[test]
    fn test_float_field_reads_back_as_float() {
        for v in [1.0, 1e21, -0.000001, 123456.789] {
            let field = Value::Float(v).to_field();
            assert_eq!(infer(&[&field]), ColumnKind::Float, "{field}");
            assert_eq!(ColumnKind::Float.parse_field(&field), Some(Value::Float(v)));
        }
    }

    #[test]
    fn test_from_text_records() {
        let dataset = Dataset::from_text_records(
            vec!["id".into(), "".into(), "when".into()],
            vec![
                vec!["1".into(), "a, b".into(), "2024-01-01".into()],
                vec!["2".into(), "".into(), "".into()],
            ],
        )
        .unwrap();

        assert_eq!(dataset.column_names(), vec!["id", "column_2", "when"]);
        assert_eq!(dataset.columns()[0].kind, ColumnKind::Integer);
        assert_eq!(dataset.columns()[1].kind, ColumnKind::Text);
        assert_eq!(dataset.columns()[2].kind, ColumnKind::Date);
        assert_eq!(dataset.get(0, "column_2"), Some(&Value::Text("a, b".into())));
        assert_eq!(dataset.get(1, "column_2"), Some(&Value::Null));
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn test_text_fields_keep_whitespace() {
        let dataset = Dataset::from_text_records(
            vec!["note".into()],
            vec![vec!["  padded ".into()], vec!["x".into()]],
        )
        .unwrap();
        assert_eq!(dataset.get(0, "note"), Some(&Value::Text("  padded ".into())));
    }

    #[test]
    fn test_duplicate_headers_renamed() {
        let dataset = Dataset::from_text_records(
            vec!["id".into(), "id".into(), "name".into(), "id".into()],
            vec![vec!["1".into(), "2".into(), "x".into(), "3".into()]],
        )
        .unwrap();
        assert_eq!(dataset.column_names(), vec!["id", "id.1", "name", "id.2"]);
        assert_eq!(dataset.get(0, "id.1"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_unique_column_names() {
        let names = |v: &[&str]| unique_column_names(v.iter().map(|s| s.to_string()));
        assert_eq!(names(&["a", "b"]), vec!["a", "b"]);
        // An existing `a.1` pushes the duplicate on to `a.2`
        assert_eq!(names(&["a", "a.1", "a"]), vec!["a", "a.1", "a.2"]);
        assert_eq!(names(&["Id", "ID", "id"]), vec!["Id", "ID.1", "id.2"]);
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut dataset = Dataset::new(vec![Column::new("a", ColumnKind::Integer)]);
        assert!(dataset.push_row(vec![Value::Int(1)]).is_ok());
        assert!(dataset.push_row(vec![Value::Int(1), Value::Int(2)]).is_err());
        assert_eq!(dataset.row_count(), 1);
    }

    #[test]
    fn test_head() {
        let dataset = Dataset::from_rows(
            vec![Column::new("n", ColumnKind::Integer)],
            (0..10).map(|i| vec![Value::Int(i)]).collect(),
        )
        .unwrap();
        let head = dataset.head(3);
        assert_eq!(head.row_count(), 3);
        assert_eq!(head.column_count(), 1);
        assert!(Dataset::empty().is_empty());
        assert_eq!(Dataset::empty().column_count(), 0);
    }
}
