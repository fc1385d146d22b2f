//! The operations a run is made of.
//!
//! Each operation borrows the run's [`DbPool`](crate::db::DbPool) and completes,
//! including its transaction, before returning.

pub mod export;
pub mod format;
pub mod loader;
pub mod query;
pub mod sql_validator;
pub mod statement;

pub use export::Exporter;
pub use format::format_preview;
pub use loader::{DEFAULT_BATCH_SIZE, LoadSummary, TableLoader};
pub use query::QueryRunner;
pub use sql_validator::validate_readonly;
pub use statement::StatementRunner;
