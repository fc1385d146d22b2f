//! Write datasets to delimited files.

use crate::error::{EtlError, EtlResult};
use crate::models::Dataset;
use humansize::{DECIMAL, format_size};
use std::path::Path;
use tracing::info;

/// Serializes datasets as CSV (RFC 4180 quoting) with a header row.
#[derive(Debug, Clone)]
pub struct Exporter {
    delimiter: u8,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write `dataset` to `path`, replacing any existing file.
    ///
    /// Returns the number of data rows written. A dataset without columns
    /// produces an empty file.
    pub fn export(&self, dataset: &Dataset, path: impl AsRef<Path>) -> EtlResult<usize> {
        let path = path.as_ref();
        let io_err = |e: csv::Error| EtlError::io(path, e.into());

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(path)
            .map_err(io_err)?;

        if dataset.column_count() > 0 {
            writer.write_record(dataset.column_names()).map_err(io_err)?;
            for row in dataset.rows() {
                writer
                    .write_record(row.iter().map(|v| v.to_field()))
                    .map_err(io_err)?;
            }
        }
        writer.flush().map_err(|e| EtlError::io(path, e))?;

        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        info!(
            path = %path.display(),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            size = %format_size(size, DECIMAL),
            "Exported dataset"
        );

        Ok(dataset.row_count())
    }
}
