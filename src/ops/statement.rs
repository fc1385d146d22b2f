//! Run DDL/DML statements in a single transaction.

use crate::db::params::bind_all;
use crate::db::pool::DbPool;
use crate::error::{EtlError, EtlResult};
use crate::models::Statement;
use sqlx::Executor;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Executes statements against the run's database.
///
/// Each call to [`StatementRunner::run`] is one transaction: either every
/// statement of the call is committed, or none is. Separate calls commit
/// independently of each other.
#[derive(Debug, Clone)]
pub struct StatementRunner {
    pool: DbPool,
}

impl StatementRunner {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Execute `statements` in order and commit once after all succeed.
    ///
    /// Returns the total number of rows affected. On the first failure the
    /// transaction is rolled back and the error, carrying the failing
    /// statement, is returned.
    pub async fn run(&self, statements: &[Statement]) -> EtlResult<u64> {
        if statements.is_empty() {
            debug!("No statements to run");
            return Ok(0);
        }

        let start = Instant::now();

        let result = crate::impl_db_dispatch!(&self.pool, |p| {
            async {
                let mut tx = p.begin().await.map_err(EtlError::from)?;
                let mut rows_affected = 0u64;

                for stmt in statements {
                    info!(sql = %stmt.sql.trim(), params = stmt.params.len(), "Executing statement");

                    // Without parameters the text goes out unprepared, so it may hold
                    // several statements
                    let outcome = if stmt.params.is_empty() {
                        (&mut *tx).execute(stmt.sql.as_str()).await
                    } else {
                        bind_all(sqlx::query(&stmt.sql), &stmt.params, &[])
                            .execute(&mut *tx)
                            .await
                    };

                    match outcome {
                        Ok(done) => rows_affected += done.rows_affected(),
                        Err(e) => {
                            let err = EtlError::from(e).with_statement(&stmt.sql);
                            error!(error = %err, statement = %stmt.sql.trim(), "Statement failed, rolling back");
                            if let Err(rollback_err) = tx.rollback().await {
                                warn!(error = %rollback_err, "Rollback failed");
                            }
                            return Err(err);
                        }
                    }
                }

                tx.commit().await.map_err(EtlError::from)?;
                Ok::<u64, EtlError>(rows_affected)
            }
            .await
        });

        if let Ok(rows_affected) = &result {
            info!(
                statements = statements.len(),
                rows_affected = *rows_affected,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Statements committed"
            );
        }

        result
    }
}
