//! Parameter binding utilities for database queries.
//!
//! One generic function binds a [`Value`] to a query of any backend; the trait
//! bounds list exactly the Rust types every supported driver can encode. Each
//! driver implements `Encode` for `Option<T>` itself, so the NULL forms are
//! listed too.

use crate::models::{ColumnKind, Value};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::query::Query;
use sqlx::{Database, Encode, Type};

/// Bind one value to a query.
///
/// NULL has to be sent with a concrete type; `null_kind` picks it. Callers that
/// know the destination column pass its kind, otherwise text.
pub(crate) fn bind_value<'q, DB>(
    query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    value: &Value,
    null_kind: ColumnKind,
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    String: Encode<'q, DB> + Type<DB>,
    Vec<u8>: Encode<'q, DB> + Type<DB>,
    NaiveDate: Encode<'q, DB> + Type<DB>,
    NaiveDateTime: Encode<'q, DB> + Type<DB>,
    Option<bool>: Encode<'q, DB>,
    Option<i64>: Encode<'q, DB>,
    Option<f64>: Encode<'q, DB>,
    Option<String>: Encode<'q, DB>,
    Option<Vec<u8>>: Encode<'q, DB>,
    Option<NaiveDate>: Encode<'q, DB>,
    Option<NaiveDateTime>: Encode<'q, DB>,
{
    match value {
        Value::Null => bind_null(query, null_kind),
        Value::Bool(v) => query.bind(*v),
        Value::Int(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Date(v) => query.bind(*v),
        Value::DateTime(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        Value::Bytes(v) => query.bind(v.clone()),
    }
}

fn bind_null<'q, DB>(
    query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    kind: ColumnKind,
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    String: Encode<'q, DB> + Type<DB>,
    Vec<u8>: Encode<'q, DB> + Type<DB>,
    NaiveDate: Encode<'q, DB> + Type<DB>,
    NaiveDateTime: Encode<'q, DB> + Type<DB>,
    Option<bool>: Encode<'q, DB>,
    Option<i64>: Encode<'q, DB>,
    Option<f64>: Encode<'q, DB>,
    Option<String>: Encode<'q, DB>,
    Option<Vec<u8>>: Encode<'q, DB>,
    Option<NaiveDate>: Encode<'q, DB>,
    Option<NaiveDateTime>: Encode<'q, DB>,
{
    match kind {
        ColumnKind::Integer => query.bind(None::<i64>),
        ColumnKind::Float => query.bind(None::<f64>),
        ColumnKind::Boolean => query.bind(None::<bool>),
        ColumnKind::Date => query.bind(None::<NaiveDate>),
        ColumnKind::DateTime => query.bind(None::<NaiveDateTime>),
        ColumnKind::Text => query.bind(None::<String>),
        ColumnKind::Binary => query.bind(None::<Vec<u8>>),
    }
}

/// Bind all values in order. `kinds[i]` types a NULL at position `i`; positions
/// past the end of `kinds` bind NULL as text.
pub(crate) fn bind_all<'q, DB>(
    mut query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    values: &[Value],
    kinds: &[ColumnKind],
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    String: Encode<'q, DB> + Type<DB>,
    Vec<u8>: Encode<'q, DB> + Type<DB>,
    NaiveDate: Encode<'q, DB> + Type<DB>,
    NaiveDateTime: Encode<'q, DB> + Type<DB>,
    Option<bool>: Encode<'q, DB>,
    Option<i64>: Encode<'q, DB>,
    Option<f64>: Encode<'q, DB>,
    Option<String>: Encode<'q, DB>,
    Option<Vec<u8>>: Encode<'q, DB>,
    Option<NaiveDate>: Encode<'q, DB>,
    Option<NaiveDateTime>: Encode<'q, DB>,
{
    for (idx, value) in values.iter().enumerate() {
        let kind = kinds.get(idx).copied().unwrap_or(ColumnKind::Text);
        query = bind_value(query, value, kind);
    }
    query
}
