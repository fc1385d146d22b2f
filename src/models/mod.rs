//! Data models for db-etl.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod dataset;
pub mod plan;
pub mod statement;

// Re-export commonly used types
pub use connection::{
    AuthMode, ConnectionConfigError, ConnectionParts, ConnectionSettings,
    DEFAULT_CONNECT_TIMEOUT_SECS, DatabaseType,
};
pub use dataset::{Column, ColumnKind, Dataset, Value};
pub use plan::{Plan, Step, StepAction};
pub use statement::{ParamInput, Statement, UploadMode};
