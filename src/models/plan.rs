//! Pipeline plans: an ordered list of steps read from JSON.
//!
//! ```json
//! {
//!   "steps": [
//!     {"name": "create", "kind": "execute", "statements": ["CREATE TABLE ..."]},
//!     {"kind": "load", "source": "reviews.csv", "table": "Reviews", "mode": "append"},
//!     {"kind": "query", "sql": "SELECT * FROM Reviews", "output": "out.csv", "preview": 5}
//!   ]
//! }
//! ```
//!
//! Relative `source` and `output` paths are resolved against the plan file's
//! directory.

use crate::error::{EtlError, EtlResult};
use crate::models::statement::{ParamInput, Statement, UploadMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(from = "StepEntry")]
pub struct Step {
    pub name: Option<String>,
    pub action: StepAction,
}

#[derive(Debug, Clone)]
pub enum StepAction {
    /// Run statements in one transaction.
    Execute { statements: Vec<Statement> },
    /// Load a CSV file into a table.
    Load {
        source: PathBuf,
        table: String,
        mode: UploadMode,
        batch_size: Option<usize>,
    },
    /// Run a read-only query, optionally exporting and previewing the result.
    Query {
        sql: String,
        params: Vec<ParamInput>,
        output: Option<PathBuf>,
        preview: Option<usize>,
    },
}

/// A step as written in a plan file.
///
/// `name` sits in every variant so that unknown fields, such as a misspelled
/// `output`, are rejected instead of silently ignored.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
enum StepEntry {
    Execute {
        #[serde(default)]
        name: Option<String>,
        statements: Vec<Statement>,
    },
    Load {
        #[serde(default)]
        name: Option<String>,
        source: PathBuf,
        table: String,
        #[serde(default)]
        mode: UploadMode,
        #[serde(default)]
        batch_size: Option<usize>,
    },
    Query {
        #[serde(default)]
        name: Option<String>,
        sql: String,
        #[serde(default)]
        params: Vec<ParamInput>,
        #[serde(default)]
        output: Option<PathBuf>,
        #[serde(default)]
        preview: Option<usize>,
    },
}

impl From<StepEntry> for Step {
    fn from(entry: StepEntry) -> Self {
        let (name, action) = match entry {
            StepEntry::Execute { name, statements } => (name, StepAction::Execute { statements }),
            StepEntry::Load {
                name,
                source,
                table,
                mode,
                batch_size,
            } => (
                name,
                StepAction::Load {
                    source,
                    table,
                    mode,
                    batch_size,
                },
            ),
            StepEntry::Query {
                name,
                sql,
                params,
                output,
                preview,
            } => (
                name,
                StepAction::Query {
                    sql,
                    params,
                    output,
                    preview,
                },
            ),
        };
        Self { name, action }
    }
}

impl StepAction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Execute { .. } => "execute",
            Self::Load { .. } => "load",
            Self::Query { .. } => "query",
        }
    }
}

impl Step {
    pub fn new(action: StepAction) -> Self {
        Self { name: None, action }
    }

    pub fn named(name: impl Into<String>, action: StepAction) -> Self {
        Self {
            name: Some(name.into()),
            action,
        }
    }

    /// Display label: the step's name, or `<kind> #<n>` (1-based).
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} #{}", self.action.kind(), index + 1),
        }
    }
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn from_json(json: &str) -> EtlResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| EtlError::invalid_input(format!("Invalid plan: {}", e)))
    }

    /// Read a plan file, resolving relative paths against its directory.
    pub fn from_file(path: impl AsRef<Path>) -> EtlResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| EtlError::io(path, e))?;
        let mut plan = Self::from_json(&json)?;
        if let Some(base) = path.parent() {
            plan.resolve_paths(base);
        }
        Ok(plan)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for step in &mut self.steps {
            match &mut step.action {
                StepAction::Load { source, .. } => resolve(source),
                StepAction::Query {
                    output: Some(output),
                    ..
                } => resolve(output),
                _ => {}
            }
        }
    }
}
