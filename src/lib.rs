//! db-etl library
//!
//! Runs SQL statements, loads CSV files into tables and exports query results
//! against SQLite, PostgreSQL or MySQL. A run is a [`Plan`] of steps executed in
//! order by a [`Pipeline`] over a single connection.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ops;
pub mod pipeline;

pub use config::Config;
pub use db::{Connector, DbPool};
pub use error::{EtlError, EtlResult};
pub use models::{ConnectionSettings, Dataset, Plan, Statement, UploadMode, Value};
pub use ops::{Exporter, QueryRunner, StatementRunner, TableLoader};
pub use pipeline::{Pipeline, PipelineOptions, RunReport};
