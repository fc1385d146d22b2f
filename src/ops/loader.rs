//! Load tabular data into a database table.
//!
//! A load reads the whole CSV source into a [`Dataset`], creates the destination
//! table from the inferred column kinds when needed, then inserts the rows in
//! batches. Each batch is its own transaction: when a later batch fails, the
//! batches before it stay committed.

use crate::db::params::bind_all;
use crate::db::pool::DbPool;
use crate::db::types::ddl_type;
use crate::error::{EtlError, EtlResult};
use crate::models::{ColumnKind, DatabaseType, Dataset, UploadMode};
use crate::ops::format::format_preview;
use humansize::{DECIMAL, format_size};
use serde::Serialize;
use sqlx::Executor;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};

/// Rows per insert transaction.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Rows shown in the debug preview of a freshly read source.
const PREVIEW_ROWS: usize = 5;

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
    pub batches: usize,
}

#[derive(Debug, Clone)]
pub struct TableLoader {
    pool: DbPool,
    batch_size: usize,
    delimiter: u8,
}

impl TableLoader {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
            delimiter: b',',
        }
    }

    /// Set the number of rows per transaction. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Read `source` and write it to `table` under `mode`.
    ///
    /// Every failure, whether parsing the source or writing a batch, is an
    /// [`EtlError::Load`] naming the table.
    pub async fn load(
        &self,
        source: impl AsRef<Path>,
        table: &str,
        mode: UploadMode,
    ) -> EtlResult<LoadSummary> {
        let source = source.as_ref();
        info!(source = %source.display(), table = %table, mode = %mode, "Loading file");

        let dataset = read_csv(source, self.delimiter).map_err(|e| e.into_load(table))?;
        self.write_dataset(&dataset, table, mode).await
    }

    /// Write an in-memory dataset to `table` under `mode`.
    pub async fn write_dataset(
        &self,
        dataset: &Dataset,
        table: &str,
        mode: UploadMode,
    ) -> EtlResult<LoadSummary> {
        if table.trim().is_empty() {
            return Err(EtlError::load(table, "Table name cannot be empty"));
        }
        if dataset.column_count() == 0 {
            return Err(EtlError::load(table, "Dataset has no columns"));
        }

        let start = Instant::now();
        let db_type = self.pool.db_type();
        let schema = schema_statements(db_type, dataset, table, mode);
        let insert_sql = insert_statement(db_type, dataset, table);
        let kinds: Vec<ColumnKind> = dataset.columns().iter().map(|c| c.kind).collect();

        debug!(table = %table, ddl = ?schema, insert = %insert_sql, "Prepared load statements");

        self.apply_schema(&schema)
            .await
            .map_err(|e| e.into_load(table))?;

        let mut batches = 0;
        let mut written = 0;
        for (batch_idx, chunk) in dataset.rows().chunks(self.batch_size).enumerate() {
            self.insert_batch(&insert_sql, chunk, &kinds)
                .await
                .map_err(|e| {
                    let err = e.into_load(table);
                    error!(
                        table = %table,
                        batch = batch_idx + 1,
                        committed_rows = written,
                        error = %err,
                        "Batch failed; earlier batches remain committed"
                    );
                    err
                })?;
            batches += 1;
            written += chunk.len();
            debug!(table = %table, batch = batches, rows = written, "Batch committed");
        }

        info!(
            table = %table,
            rows = written,
            columns = dataset.column_count(),
            batches,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Load complete"
        );

        Ok(LoadSummary {
            table: table.to_string(),
            rows: written,
            columns: dataset.column_count(),
            batches,
        })
    }

    /// Run the drop/create statements in their own transaction.
    async fn apply_schema(&self, statements: &[String]) -> EtlResult<()> {
        crate::impl_db_dispatch!(&self.pool, |p| {
            async {
                let mut tx = p.begin().await.map_err(EtlError::from)?;
                for sql in statements {
                    (&mut *tx)
                        .execute(sql.as_str())
                        .await
                        .map_err(|e| EtlError::from(e).with_statement(sql))?;
                }
                tx.commit().await.map_err(EtlError::from)?;
                Ok::<(), EtlError>(())
            }
            .await
        })
    }

    /// Insert one batch of rows in one transaction. Dropping the transaction on
    /// error rolls the batch back.
    async fn insert_batch(
        &self,
        insert_sql: &str,
        rows: &[Vec<crate::models::Value>],
        kinds: &[ColumnKind],
    ) -> EtlResult<()> {
        crate::impl_db_dispatch!(&self.pool, |p| {
            async {
                let mut tx = p.begin().await.map_err(EtlError::from)?;
                for row in rows {
                    bind_all(sqlx::query(insert_sql), row, kinds)
                        .execute(&mut *tx)
                        .await
                        .map_err(EtlError::from)?;
                }
                tx.commit().await.map_err(EtlError::from)?;
                Ok::<(), EtlError>(())
            }
            .await
        })
    }
}

/// Read a delimited file with a header row, inferring column kinds.
pub fn read_csv(path: &Path, delimiter: u8) -> EtlResult<Dataset> {
    let size = std::fs::metadata(path)
        .map_err(|e| EtlError::io(path, e))?
        .len();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)
        .map_err(|e| EtlError::io(path, e.into()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(String::from)
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        records.push(record.iter().map(String::from).collect());
    }

    let dataset = Dataset::from_text_records(headers, records).map_err(|e| match e {
        EtlError::InvalidInput { message } => {
            EtlError::invalid_input(format!("{}: {}", path.display(), message))
        }
        other => other,
    })?;

    info!(
        path = %path.display(),
        size = %format_size(size, DECIMAL),
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "Read source file"
    );
    debug!(
        "First rows of {}:\n{}",
        path.display(),
        format_preview(&dataset, PREVIEW_ROWS)
    );

    Ok(dataset)
}

fn csv_error(path: &Path, err: csv::Error) -> EtlError {
    EtlError::invalid_input(format!("Malformed CSV {}: {}", path.display(), err))
}

/// DDL that makes `table` ready to receive `dataset`.
fn schema_statements(
    db_type: DatabaseType,
    dataset: &Dataset,
    table: &str,
    mode: UploadMode,
) -> Vec<String> {
    let quoted_table = db_type.quote_table_name(table);
    let columns = dataset
        .columns()
        .iter()
        .map(|c| {
            format!(
                "{} {}",
                db_type.quote_identifier(&c.name),
                ddl_type(db_type, c.kind)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    match mode {
        UploadMode::Replace => vec![
            format!("DROP TABLE IF EXISTS {}", quoted_table),
            format!("CREATE TABLE {} ({})", quoted_table, columns),
        ],
        UploadMode::Append => vec![format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quoted_table, columns
        )],
    }
}

fn insert_statement(db_type: DatabaseType, dataset: &Dataset, table: &str) -> String {
    let columns = dataset
        .columns()
        .iter()
        .map(|c| db_type.quote_identifier(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=dataset.column_count())
        .map(|i| db_type.placeholder(i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        db_type.quote_table_name(table),
        columns,
        placeholders
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, Value};

    fn sample() -> Dataset {
        Dataset::from_rows(
            vec![
                Column::new("id", ColumnKind::Integer),
                Column::new("review text", ColumnKind::Text),
                Column::new("day", ColumnKind::Date),
            ],
            vec![vec![Value::Int(1), Value::from("ok"), Value::Null]],
        )
        .unwrap()
    }

    #[test]
    fn test_schema_statements_replace() {
        let ddl = schema_statements(DatabaseType::PostgreSQL, &sample(), "etl.reviews", UploadMode::Replace);
        assert_eq!(
            ddl,
            vec![
                "DROP TABLE IF EXISTS \"etl\".\"reviews\"".to_string(),
                "CREATE TABLE \"etl\".\"reviews\" (\"id\" BIGINT, \"review text\" TEXT, \"day\" DATE)"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_schema_statements_append() {
        let ddl = schema_statements(DatabaseType::MySQL, &sample(), "reviews", UploadMode::Append);
        assert_eq!(
            ddl,
            vec!["CREATE TABLE IF NOT EXISTS `reviews` (`id` BIGINT, `review text` TEXT, `day` DATE)"
                .to_string()]
        );
    }

    #[test]
    fn test_insert_statement_placeholders() {
        assert_eq!(
            insert_statement(DatabaseType::PostgreSQL, &sample(), "reviews"),
            "INSERT INTO \"reviews\" (\"id\", \"review text\", \"day\") VALUES ($1, $2, $3)"
        );
        assert_eq!(
            insert_statement(DatabaseType::SQLite, &sample(), "reviews"),
            "INSERT INTO \"reviews\" (\"id\", \"review text\", \"day\") VALUES (?, ?, ?)"
        );
    }

    #[test]
    fn test_read_csv_reports_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        std::fs::write(&path, "a,b\n1,2\n3\n").unwrap();

        let err = read_csv(&path, b',').unwrap_err();
        assert!(matches!(err, EtlError::InvalidInput { .. }));
        assert!(err.to_string().contains("ragged.csv"));
    }

    #[test]
    fn test_read_csv_with_semicolons() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("semi.csv");
        std::fs::write(&path, "name;score\n\"a;b\";1.5\nc;2\n").unwrap();

        let dataset = read_csv(&path, b';').unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.columns()[1].kind, ColumnKind::Float);
        assert_eq!(dataset.get(0, "name"), Some(&Value::from("a;b")));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_csv(Path::new("/no/such/file.csv"), b',').unwrap_err();
        assert!(matches!(err, EtlError::Io { .. }));
        assert!(matches!(err.into_load("t"), EtlError::Load { .. }));
    }
}
