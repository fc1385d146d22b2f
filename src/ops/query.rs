//! Read-only queries materialized into a [`Dataset`].

use crate::db::params::bind_all;
use crate::db::pool::DbPool;
use crate::db::types::{RowToValues, TypeCategory, column_categories};
use crate::error::{EtlError, EtlResult};
use crate::models::dataset::unique_column_names;
use crate::models::{Column, ColumnKind, Dataset, Statement, Value};
use crate::ops::sql_validator::validate_readonly;
use futures_util::TryStreamExt;
use sqlx::{Executor, Row};
use std::time::Instant;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct QueryRunner {
    pool: DbPool,
}

impl QueryRunner {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run `sql` and return its rows, or an empty dataset if anything fails.
    ///
    /// The failure is logged. Use [`QueryRunner::fetch`] to tell a failed query
    /// apart from one that matched nothing.
    pub async fn query(&self, sql: &str) -> Dataset {
        match self.fetch(sql).await {
            Ok(dataset) => dataset,
            Err(e) => {
                error!(error = %e, sql = %sql.trim(), "Query failed, returning empty result");
                Dataset::empty()
            }
        }
    }

    pub async fn fetch(&self, sql: &str) -> EtlResult<Dataset> {
        self.fetch_statement(&Statement::new(sql)).await
    }

    /// Validate, run and decode a parameterized read-only statement.
    ///
    /// A result with no rows still carries its columns, taken from the
    /// statement description.
    pub async fn fetch_statement(&self, statement: &Statement) -> EtlResult<Dataset> {
        let db_type = self.pool.db_type();
        let sql = statement.sql.as_str();
        validate_readonly(sql, db_type)?;

        info!(sql = %sql.trim(), params = statement.params.len(), "Running query");
        let start = Instant::now();

        let (described, rows) = crate::impl_db_dispatch!(&self.pool, |p| {
            async {
                let fetched = bind_all(sqlx::query(sql), &statement.params, &[])
                    .fetch(p)
                    .try_collect::<Vec<_>>()
                    .await
                    .map_err(EtlError::from)?;

                let described = match fetched.first() {
                    Some(row) => column_categories(row.columns(), db_type),
                    None => {
                        let description = p.describe(sql).await.map_err(EtlError::from)?;
                        column_categories(description.columns(), db_type)
                    }
                };
                let categories: Vec<TypeCategory> = described.iter().map(|(_, c)| *c).collect();

                let rows = fetched
                    .iter()
                    .map(|row| row.to_values(&categories))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(EtlError::from)?;
                Ok::<_, EtlError>((described, rows))
            }
            .await
        })
        .map_err(|e| e.with_statement(sql).into_query())?;

        // A join can return the same name twice; the export must load back
        let (names, categories): (Vec<String>, Vec<TypeCategory>) = described.into_iter().unzip();
        let columns = unique_column_names(names)
            .into_iter()
            .zip(categories)
            .enumerate()
            .map(|(idx, (name, category))| {
                let kind = resolve_kind(category, rows.iter().map(|r| &r[idx]));
                Column::new(name, kind)
            })
            .collect();
        let dataset = Dataset::from_rows(columns, rows)?;

        debug!(
            columns = ?dataset.column_names(),
            "Query columns"
        );
        info!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Query complete"
        );

        Ok(dataset)
    }
}

/// Declared kind of a result column, unless its values say otherwise.
///
/// SQLite lets a column hold values of any storage class, and expressions have
/// no declared type at all; both fall back to what the values show.
fn resolve_kind<'a>(
    category: TypeCategory,
    values: impl Iterator<Item = &'a Value> + Clone,
) -> ColumnKind {
    match category.column_kind() {
        Some(kind) if values.clone().all(|v| v.is_null() || v.kind() == Some(kind)) => kind,
        _ => ColumnKind::of_values(values),
    }
}
