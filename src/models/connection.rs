//! Connection-related data models.
//!
//! A run talks to exactly one database. [`ConnectionSettings`] is built once at
//! startup, either from a full URL or from individual driver/server/database
//! parts, and is never mutated afterwards.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default pool acquire/connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Supported database types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[value(name = "postgres", alias = "postgresql")]
    #[serde(rename = "postgres", alias = "postgresql")]
    PostgreSQL,
    /// Includes MariaDB
    #[value(name = "mysql", alias = "mariadb")]
    #[serde(alias = "mariadb")]
    MySQL,
    #[value(name = "sqlite")]
    SQLite,
}

impl DatabaseType {
    /// Parse database type from a connection string.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let lower = connection_string.to_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Self::PostgreSQL)
        } else if lower.starts_with("mysql://") || lower.starts_with("mariadb://") {
            Some(Self::MySQL)
        } else if lower.starts_with("sqlite://") || lower.starts_with("sqlite:") {
            Some(Self::SQLite)
        } else {
            None
        }
    }

    /// Get the display name for this database type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
            Self::SQLite => "SQLite",
        }
    }

    /// Get the default port for this database type.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::PostgreSQL => Some(5432),
            Self::MySQL => Some(3306),
            Self::SQLite => None,
        }
    }

    fn url_scheme(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "postgres",
            Self::MySQL => "mysql",
            Self::SQLite => "sqlite",
        }
    }

    /// Bind placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::PostgreSQL => format!("${}", index),
            Self::MySQL | Self::SQLite => "?".to_string(),
        }
    }

    /// Quote a single identifier, escaping embedded quote characters.
    pub fn quote_identifier(&self, name: &str) -> String {
        match self {
            Self::MySQL => format!("`{}`", name.replace('`', "``")),
            Self::PostgreSQL | Self::SQLite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// Quote a possibly schema-qualified table name (`schema.table`).
    pub fn quote_table_name(&self, table: &str) -> String {
        table
            .split('.')
            .map(|part| self.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How credentials are presented to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Username and password sent with the connection.
    #[default]
    Password,
    /// No credentials in the connection; the server authenticates the OS user.
    Trusted,
}

/// Individual connection components, as supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConnectionParts {
    pub driver: Option<DatabaseType>,
    /// `host[:port]`
    pub server: Option<String>,
    /// Database name, or the file path for SQLite.
    pub database: Option<String>,
    pub auth_mode: AuthMode,
    pub username: Option<String>,
    /// Contains sensitive data - never log
    pub password: Option<String>,
}

/// Validated, immutable configuration for the single connection of a run.
#[derive(Clone)]
pub struct ConnectionSettings {
    pub db_type: DatabaseType,
    /// Contains sensitive data - never log
    connection_string: String,
    /// Database name (file path for SQLite). None when the URL names no database.
    pub database: Option<String>,
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("db_type", &self.db_type)
            .field("connection_string", &self.masked_connection_string())
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl ConnectionSettings {
    /// Build settings from a full connection URL.
    pub fn from_url(connection_string: impl Into<String>) -> Result<Self, ConnectionConfigError> {
        let connection_string = connection_string.into();
        let db_type = DatabaseType::from_connection_string(&connection_string).ok_or_else(|| {
            ConnectionConfigError::UnknownDatabaseType(mask_url(&connection_string))
        })?;

        let database = match db_type {
            DatabaseType::SQLite => {
                let path = sqlite_path(&connection_string);
                if path.is_empty() {
                    return Err(ConnectionConfigError::MissingDatabase(db_type));
                }
                Some(path.to_string())
            }
            _ => {
                let url = Url::parse(&connection_string)
                    .map_err(|e| ConnectionConfigError::InvalidUrl(e.to_string()))?;
                if url.host_str().is_none_or(str::is_empty) {
                    return Err(ConnectionConfigError::MissingServer(db_type));
                }
                let name = url.path().trim_start_matches('/');
                (!name.is_empty()).then(|| name.to_string())
            }
        };

        Ok(Self {
            db_type,
            connection_string,
            database,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }

    /// Build settings from individual components.
    pub fn from_parts(parts: &ConnectionParts) -> Result<Self, ConnectionConfigError> {
        let db_type = parts.driver.ok_or(ConnectionConfigError::MissingDriver)?;
        let database = parts
            .database
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(ConnectionConfigError::MissingDatabase(db_type))?;

        if db_type == DatabaseType::SQLite {
            if parts.server.is_some() {
                return Err(ConnectionConfigError::UnexpectedServer);
            }
            if parts.username.is_some() || parts.password.is_some() {
                return Err(ConnectionConfigError::UnexpectedCredentials(
                    "SQLite does not use credentials",
                ));
            }
            return Ok(Self::sqlite(database));
        }

        let server = parts
            .server
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConnectionConfigError::MissingServer(db_type))?;

        let mut url = Url::parse(&format!("{}://{}", db_type.url_scheme(), server))
            .map_err(|e| ConnectionConfigError::InvalidUrl(format!("server '{}': {}", server, e)))?;
        url.set_path(database);

        match parts.auth_mode {
            AuthMode::Password => {
                let username = parts
                    .username
                    .as_deref()
                    .filter(|u| !u.is_empty())
                    .ok_or(ConnectionConfigError::MissingUsername)?;
                url.set_username(username)
                    .map_err(|_| ConnectionConfigError::InvalidUrl("invalid username".into()))?;
                url.set_password(parts.password.as_deref())
                    .map_err(|_| ConnectionConfigError::InvalidUrl("invalid password".into()))?;
            }
            AuthMode::Trusted => {
                if parts.username.is_some() || parts.password.is_some() {
                    return Err(ConnectionConfigError::UnexpectedCredentials(
                        "trusted authentication does not take a username or password",
                    ));
                }
            }
        }

        Ok(Self {
            db_type,
            connection_string: url.to_string(),
            database: Some(database.to_string()),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }

    /// Settings for a SQLite database file, created on connect if missing.
    pub fn sqlite(path: impl AsRef<str>) -> Self {
        let path = path.as_ref();
        Self {
            db_type: DatabaseType::SQLite,
            connection_string: format!("sqlite:{}", path),
            database: Some(path.to_string()),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Raw connection string. Contains credentials; only hand it to the driver.
    pub(crate) fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Get a display-safe version of the connection string (credentials masked).
    pub fn masked_connection_string(&self) -> String {
        mask_url(&self.connection_string)
    }
}

fn sqlite_path(connection_string: &str) -> &str {
    let rest = connection_string
        .strip_prefix("sqlite://")
        .or_else(|| connection_string.strip_prefix("sqlite:"))
        .unwrap_or(connection_string);
    rest.split('?').next().unwrap_or(rest)
}

fn mask_url(connection_string: &str) -> String {
    match Url::parse(connection_string) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("****")).is_ok() {
                url.to_string()
            } else {
                "<redacted>".to_string()
            }
        }
        Ok(_) => connection_string.to_string(),
        // Unparseable strings may still carry credentials
        Err(_) if connection_string.contains('@') => "<redacted>".to_string(),
        Err(_) => connection_string.to_string(),
    }
}

/// Errors that can occur when creating a connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionConfigError {
    #[error("Unknown database type in connection string: {0}")]
    UnknownDatabaseType(String),

    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("A database driver is required (--driver sqlite|postgres|mysql)")]
    MissingDriver,

    #[error("{0} requires a server address (--server host[:port])")]
    MissingServer(DatabaseType),

    #[error("{0} requires a database name (--database)")]
    MissingDatabase(DatabaseType),

    #[error("SQLite does not take a server address")]
    UnexpectedServer,

    #[error("Password authentication requires a username (--username)")]
    MissingUsername,

    #[error("Unexpected credentials: {0}")]
    UnexpectedCredentials(&'static str),

    #[error("--url cannot be combined with --driver, --server, --database or credentials")]
    ConflictingSources,

    #[error("No connection configured: pass --url or --driver with --database")]
    NotConfigured,
}

impl From<ConnectionConfigError> for crate::error::EtlError {
    fn from(err: ConnectionConfigError) -> Self {
        crate::error::EtlError::config(err.to_string())
    }
}
