//! Read-only validation for the query path.
//!
//! Queries are parsed with [sqlparser](https://docs.rs/sqlparser/) using the
//! backend's dialect. Only statements that return rows without changing anything
//! pass; writes belong in an `execute` step.

use crate::error::{EtlError, EtlResult};
use crate::models::DatabaseType;
use sqlparser::ast::{Query, SetExpr, Statement};
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

/// Type of SQL statement detected by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlStatementType {
    /// SELECT and other read-only queries (SELECT, SHOW, VALUES, EXPLAIN)
    Select,
    /// INSERT, UPDATE, DELETE, MERGE, COPY
    DmlWrite,
    /// CREATE, DROP, ALTER, TRUNCATE
    Ddl,
    /// BEGIN, COMMIT, ROLLBACK, SAVEPOINT
    Transaction,
    /// Anything else, including SET, PRAGMA and procedure calls
    Other,
}

/// Get the appropriate SQL dialect for the given database type.
fn get_dialect(db_type: DatabaseType) -> Box<dyn Dialect> {
    match db_type {
        DatabaseType::PostgreSQL => Box::new(PostgreSqlDialect {}),
        DatabaseType::MySQL => Box::new(MySqlDialect {}),
        DatabaseType::SQLite => Box::new(SQLiteDialect {}),
    }
}

/// Validate that `sql` only reads.
///
/// Unparseable text and any non-read statement are [`EtlError::Query`] errors.
pub fn validate_readonly(sql: &str, db_type: DatabaseType) -> EtlResult<()> {
    let dialect = get_dialect(db_type);

    let statements = Parser::parse_sql(dialect.as_ref(), sql)
        .map_err(|e| EtlError::query(format!("Failed to parse SQL statement: {}", e)))?;

    if statements.is_empty() {
        return Err(EtlError::query("Empty SQL statement"));
    }

    for stmt in &statements {
        let (stmt_type, operation) = classify_statement(stmt);
        let hint = match stmt_type {
            SqlStatementType::Select => continue,
            SqlStatementType::DmlWrite => "use an execute step for INSERT/UPDATE/DELETE",
            SqlStatementType::Ddl => "use an execute step for schema changes",
            SqlStatementType::Transaction => "each step manages its own transaction",
            SqlStatementType::Other => "only SELECT queries are allowed",
        };
        return Err(EtlError::query(format!(
            "{} is not a read-only query; {}",
            operation, hint
        )));
    }

    // Result sets of separate statements would be merged under the first one's columns
    if statements.len() > 1 {
        return Err(EtlError::query(format!(
            "Expected a single query, found {} statements",
            statements.len()
        )));
    }

    Ok(())
}

/// Classify a parsed statement into a statement type.
fn classify_statement(stmt: &Statement) -> (SqlStatementType, &'static str) {
    match stmt {
        Statement::Query(query) if query_writes(query) => {
            (SqlStatementType::DmlWrite, "Data-modifying SELECT")
        }
        Statement::Query(_) => (SqlStatementType::Select, "SELECT"),
        Statement::ShowTables { .. } => (SqlStatementType::Select, "SHOW TABLES"),
        Statement::ShowColumns { .. } => (SqlStatementType::Select, "SHOW COLUMNS"),
        Statement::ExplainTable { .. } => (SqlStatementType::Select, "EXPLAIN TABLE"),

        // EXPLAIN is only as safe as the statement it wraps (EXPLAIN ANALYZE runs it)
        Statement::Explain { statement, .. } => {
            let (inner_type, inner_name) = classify_statement(statement);
            if inner_type == SqlStatementType::Select {
                (SqlStatementType::Select, "EXPLAIN")
            } else {
                (inner_type, inner_name)
            }
        }

        Statement::Insert(_) => (SqlStatementType::DmlWrite, "INSERT"),
        Statement::Update { .. } => (SqlStatementType::DmlWrite, "UPDATE"),
        Statement::Delete(_) => (SqlStatementType::DmlWrite, "DELETE"),
        Statement::Merge { .. } => (SqlStatementType::DmlWrite, "MERGE"),
        Statement::Copy { .. } => (SqlStatementType::DmlWrite, "COPY"),

        Statement::CreateTable { .. } => (SqlStatementType::Ddl, "CREATE TABLE"),
        Statement::CreateView { .. } => (SqlStatementType::Ddl, "CREATE VIEW"),
        Statement::CreateIndex(_) => (SqlStatementType::Ddl, "CREATE INDEX"),
        Statement::CreateSchema { .. } => (SqlStatementType::Ddl, "CREATE SCHEMA"),
        Statement::AlterTable { .. } => (SqlStatementType::Ddl, "ALTER TABLE"),
        Statement::Drop { .. } => (SqlStatementType::Ddl, "DROP"),
        Statement::Truncate { .. } => (SqlStatementType::Ddl, "TRUNCATE"),

        Statement::StartTransaction { .. } => (SqlStatementType::Transaction, "BEGIN"),
        Statement::Commit { .. } => (SqlStatementType::Transaction, "COMMIT"),
        Statement::Rollback { .. } => (SqlStatementType::Transaction, "ROLLBACK"),
        Statement::Savepoint { .. } => (SqlStatementType::Transaction, "SAVEPOINT"),

        Statement::Set(_) => (SqlStatementType::Other, "SET"),
        Statement::Pragma { .. } => (SqlStatementType::Other, "PRAGMA"),
        Statement::Call { .. } => (SqlStatementType::Other, "CALL"),
        Statement::Vacuum { .. } => (SqlStatementType::Other, "VACUUM"),

        _ => (SqlStatementType::Other, "Statement"),
    }
}

/// Whether a query changes data: `SELECT ... INTO` or a CTE wrapping a write.
fn query_writes(query: &Query) -> bool {
    let cte_writes = query
        .with
        .as_ref()
        .is_some_and(|with| with.cte_tables.iter().any(|cte| query_writes(&cte.query)));
    cte_writes || set_expr_writes(&query.body)
}

fn set_expr_writes(expr: &SetExpr) -> bool {
    match expr {
        SetExpr::Select(select) => select.into.is_some(),
        SetExpr::Query(query) => query_writes(query),
        SetExpr::SetOperation { left, right, .. } => {
            set_expr_writes(left) || set_expr_writes(right)
        }
        SetExpr::Values(_) | SetExpr::Table(_) => false,
        _ => true,
    }
}
