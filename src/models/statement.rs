//! Statements, bound parameters and upload modes.

use crate::models::dataset::Value;
use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One SQL command plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "StatementInput")]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Self::new(sql)
    }
}

/// Plan-file shape of a statement: either bare SQL text or SQL with params.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatementInput {
    Sql(String),
    WithParams {
        sql: String,
        #[serde(default)]
        params: Vec<ParamInput>,
    },
}

impl From<StatementInput> for Statement {
    fn from(input: StatementInput) -> Self {
        match input {
            StatementInput::Sql(sql) => Statement::new(sql),
            StatementInput::WithParams { sql, params } => Statement {
                sql,
                params: params.into_iter().map(Value::from).collect(),
            },
        }
    }
}

/// A parameter value as written in JSON.
///
/// Plain JSON scalars map to null/bool/integer/float/text. Dates and datetimes
/// must be tagged explicitly (`{"date": "2024-01-31"}`), otherwise they bind as
/// text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamInput {
    Null(()),
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date { date: NaiveDate },
    DateTime { datetime: NaiveDateTime },
}

impl From<ParamInput> for Value {
    fn from(input: ParamInput) -> Self {
        match input {
            ParamInput::Null(()) => Value::Null,
            ParamInput::Bool(v) => Value::Bool(v),
            ParamInput::Int(v) => Value::Int(v),
            ParamInput::Float(v) => Value::Float(v),
            ParamInput::Text(v) => Value::Text(v),
            ParamInput::Date { date } => Value::Date(date),
            ParamInput::DateTime { datetime } => Value::DateTime(datetime),
        }
    }
}

/// How a load reconciles with an existing destination table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Drop the table if it exists, recreate it, then insert.
    Replace,
    /// Create the table only if missing, then insert.
    #[default]
    Append,
}

impl std::fmt::Display for UploadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replace => f.write_str("replace"),
            Self::Append => f.write_str("append"),
        }
    }
}
