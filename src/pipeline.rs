//! Sequential execution of a [`Plan`].
//!
//! Steps run one after another against a single [`DbPool`]. A connection failure
//! ends the run; any other failure is logged, printed to stderr and recorded in
//! the [`RunReport`], and the next step starts.

use crate::db::DbPool;
use crate::error::{EtlError, EtlResult};
use crate::models::{Plan, Statement, Step, StepAction, Value};
use crate::ops::{
    DEFAULT_BATCH_SIZE, Exporter, LoadSummary, QueryRunner, StatementRunner, TableLoader,
    format_preview,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

/// Knobs shared by every step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Default rows per insert transaction; a load step may override it.
    pub batch_size: usize,
    /// Field delimiter for CSV input and output.
    pub delimiter: u8,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delimiter: b',',
        }
    }
}

/// What a successful step produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Executed { rows_affected: u64 },
    Loaded(LoadSummary),
    Queried {
        rows: usize,
        columns: usize,
        /// Destination file and rows written, when the step exports.
        exported: Option<(PathBuf, usize)>,
    },
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Executed { rows_affected } => write!(f, "{} row(s) affected", rows_affected),
            Self::Loaded(summary) => write!(
                f,
                "{} row(s) x {} column(s) loaded into {} in {} batch(es)",
                summary.rows, summary.columns, summary.table, summary.batches
            ),
            Self::Queried {
                rows,
                columns,
                exported: Some((path, _)),
            } => write!(
                f,
                "{} row(s) x {} column(s) exported to {}",
                rows,
                columns,
                path.display()
            ),
            Self::Queried { rows, columns, .. } => {
                write!(f, "{} row(s) x {} column(s)", rows, columns)
            }
        }
    }
}

#[derive(Debug)]
pub struct StepReport {
    pub name: String,
    pub kind: &'static str,
    pub result: EtlResult<StepOutcome>,
}

impl StepReport {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of every step that ran, in plan order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
    /// Set when a fatal error stopped the run before the last step.
    pub aborted: bool,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        !self.aborted && self.steps.iter().all(StepReport::succeeded)
    }

    pub fn succeeded_count(&self) -> usize {
        self.steps.iter().filter(|s| s.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.steps.len() - self.succeeded_count()
    }

    pub fn aborted(&self) -> bool {
        self.aborted
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    pool: DbPool,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(pool: DbPool) -> Self {
        Self::with_options(pool, PipelineOptions::default())
    }

    pub fn with_options(pool: DbPool, options: PipelineOptions) -> Self {
        Self { pool, options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run every step of `plan` in order.
    pub async fn run(&self, plan: &Plan) -> RunReport {
        let start = Instant::now();
        let mut report = RunReport::default();
        info!(steps = plan.steps.len(), "Starting run");

        for (index, step) in plan.steps.iter().enumerate() {
            let name = step.label(index);
            let kind = step.action.kind();
            info!(step = %name, kind, "Starting step");

            let result = self.run_step(step).await;
            match &result {
                Ok(outcome) => info!(step = %name, kind, outcome = %outcome, "Step succeeded"),
                Err(e) => report_failure(&name, e),
            }

            let fatal = result.as_ref().is_err_and(EtlError::is_fatal);
            report.steps.push(StepReport { name, kind, result });

            if fatal {
                let skipped = plan.steps.len() - index - 1;
                warn!(skipped, "Connection lost, aborting run");
                report.aborted = true;
                break;
            }
        }

        info!(
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            aborted = report.aborted,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Run finished"
        );
        report
    }

    async fn run_step(&self, step: &Step) -> EtlResult<StepOutcome> {
        match &step.action {
            StepAction::Execute { statements } => {
                let rows_affected = StatementRunner::new(self.pool.clone())
                    .run(statements)
                    .await?;
                Ok(StepOutcome::Executed { rows_affected })
            }
            StepAction::Load {
                source,
                table,
                mode,
                batch_size,
            } => {
                let summary = TableLoader::new(self.pool.clone())
                    .with_batch_size(batch_size.unwrap_or(self.options.batch_size))
                    .with_delimiter(self.options.delimiter)
                    .load(source, table, *mode)
                    .await?;
                Ok(StepOutcome::Loaded(summary))
            }
            StepAction::Query {
                sql,
                params,
                output,
                preview,
            } => {
                let statement = Statement::new(sql.as_str())
                    .with_params(params.iter().cloned().map(Value::from).collect());
                let dataset = QueryRunner::new(self.pool.clone())
                    .fetch_statement(&statement)
                    .await?;

                if let Some(max_rows) = preview {
                    println!("{}", format_preview(&dataset, *max_rows));
                }

                let exported = match output {
                    Some(path) => {
                        let written = Exporter::new()
                            .with_delimiter(self.options.delimiter)
                            .export(&dataset, path)?;
                        Some((path.clone(), written))
                    }
                    None => None,
                };

                Ok(StepOutcome::Queried {
                    rows: dataset.row_count(),
                    columns: dataset.column_count(),
                    exported,
                })
            }
        }
    }
}

/// Log a failed step with whatever context the error carries, and tell the user.
fn report_failure(step: &str, err: &EtlError) {
    match (err.failed_statement(), err.suggestion()) {
        (Some(statement), _) => {
            error!(step = %step, error = %err, statement = %statement, "Step failed")
        }
        (None, Some(suggestion)) => {
            error!(step = %step, error = %err, suggestion = %suggestion, "Step failed")
        }
        (None, None) => error!(step = %step, error = %err, "Step failed"),
    }

    eprintln!("Step '{}' failed: {}", step, err);
    if let Some(statement) = err.failed_statement() {
        eprintln!("  statement: {}", statement);
    }
    if let Some(suggestion) = err.suggestion() {
        eprintln!("  hint: {}", suggestion);
    }
}
