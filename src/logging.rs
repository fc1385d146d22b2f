//! Logging setup.
//!
//! Console output goes to stderr so that query previews on stdout stay clean.
//! With a log directory configured, every run also writes a plain-text log file
//! named after its start time.

use crate::error::{EtlError, EtlResult};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Filter directive used when `RUST_LOG` is not set, e.g. `info` or `db_etl=debug`.
    pub level: String,
    pub json: bool,
    pub log_dir: Option<PathBuf>,
}

/// Name of the log file for a run started at `started`.
pub fn log_file_name(started: DateTime<Local>) -> String {
    started.format("log_%Y%m%d_%H%M%S.txt").to_string()
}

/// Install the global subscriber. Returns the log file path, if one was opened.
pub fn init(options: &LogOptions) -> EtlResult<Option<PathBuf>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if options.json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr)
                .boxed(),
        );
    }

    let log_path = match &options.log_dir {
        Some(dir) => {
            let (path, file) = create_log_file(dir)?;
            layers.push(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .boxed(),
            );
            Some(path)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| EtlError::config(format!("Failed to initialize logging: {}", e)))?;

    Ok(log_path)
}

fn create_log_file(dir: &Path) -> EtlResult<(PathBuf, File)> {
    fs::create_dir_all(dir).map_err(|e| EtlError::io(dir, e))?;
    let path = dir.join(log_file_name(Local::now()));
    let file = File::create(&path).map_err(|e| EtlError::io(&path, e))?;
    Ok((path, file))
}
