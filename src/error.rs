//! Error types for db-etl.
//!
//! All operations return [`EtlError`]. Only [`EtlError::Connection`] is fatal for a
//! run: nothing else can succeed without a database. Every other kind is logged by
//! the caller and the run moves on to the next operation.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Statement failed: {message}")]
    Statement {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        /// The statement text that triggered the failure, when known.
        statement: Option<String>,
    },

    #[error("Load into '{table}' failed: {message}")]
    Load { table: String, message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl EtlError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a statement error with optional SQL state.
    pub fn statement(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Statement {
            message: message.into(),
            sql_state,
            statement: None,
        }
    }

    pub fn load(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Attach the triggering statement text to a statement error.
    pub fn with_statement(self, sql: &str) -> Self {
        match self {
            Self::Statement {
                message, sql_state, ..
            } => Self::Statement {
                message,
                sql_state,
                statement: Some(sql.trim().to_string()),
            },
            other => other,
        }
    }

    /// Re-classify a non-fatal error as a load failure for `table`.
    ///
    /// Connection errors are kept as they are so that they still abort the run.
    pub fn into_load(self, table: &str) -> Self {
        match self {
            Self::Connection { .. } | Self::Load { .. } => self,
            other => Self::load(table, other.detail()),
        }
    }

    /// Re-classify a non-fatal error as a query failure.
    pub fn into_query(self) -> Self {
        match self {
            Self::Connection { .. } | Self::Query { .. } => self,
            other => Self::query(other.detail()),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// The statement that triggered this error, if it carries one.
    pub fn failed_statement(&self) -> Option<&str> {
        match self {
            Self::Statement { statement, .. } => statement.as_deref(),
            _ => None,
        }
    }

    /// A failed connection means no later operation can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Message without the variant prefix, with SQLSTATE appended when known.
    fn detail(&self) -> String {
        match self {
            Self::Statement {
                message,
                sql_state: Some(code),
                ..
            } => format!("{} (SQLSTATE: {})", message, code),
            Self::Statement { message, .. }
            | Self::Query { message }
            | Self::Load { message, .. }
            | Self::Config { message }
            | Self::InvalidInput { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Convert sqlx errors to EtlError.
///
/// Transport-level failures become connection errors; everything the server
/// reports about a statement becomes a statement error.
impl From<sqlx::Error> for EtlError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => EtlError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                EtlError::statement(db_err.message(), code)
            }
            sqlx::Error::PoolTimedOut => EtlError::connection(
                "Timed out acquiring a connection",
                "Check that the database server is reachable",
            ),
            sqlx::Error::PoolClosed => {
                EtlError::connection("Connection pool is closed", "Reconnect to the database")
            }
            sqlx::Error::Io(io_err) => EtlError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => EtlError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => EtlError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::WorkerCrashed => EtlError::connection(
                "Database worker crashed",
                "Reconnect to the database",
            ),
            sqlx::Error::RowNotFound => EtlError::statement("No rows returned", None),
            sqlx::Error::TypeNotFound { type_name } => {
                EtlError::statement(format!("Type not found: {}", type_name), None)
            }
            sqlx::Error::ColumnNotFound(col) => {
                EtlError::statement(format!("Column not found: {}", col), None)
            }
            sqlx::Error::ColumnDecode { index, source } => {
                EtlError::statement(format!("Failed to decode column {}: {}", index, source), None)
            }
            sqlx::Error::Decode(source) => {
                EtlError::statement(format!("Decode error: {}", source), None)
            }
            other => EtlError::statement(format!("Database error: {}", other), None),
        }
    }
}

impl From<csv::Error> for EtlError {
    fn from(err: csv::Error) -> Self {
        EtlError::invalid_input(format!("CSV error: {}", err))
    }
}

/// Result type alias for db-etl operations.
pub type EtlResult<T> = Result<T, EtlError>;
