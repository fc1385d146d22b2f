//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection setup, one pool per backend
//! - Parameter binding for [`Value`](crate::models::Value)s
//! - Type mappings between backend columns and dataset kinds
//! - Database dispatch macros for reducing code duplication

#[macro_use]
pub mod macros;
pub mod params;
pub mod pool;
pub mod types;

pub use pool::{Connector, DbPool};
pub use types::{RowToValues, TypeCategory};
