mod common;

use common::{sqlite_pool, write_file};
use db_etl::error::EtlError;
use db_etl::models::{ColumnKind, UploadMode, Value};
use db_etl::ops::loader::read_csv;
use db_etl::ops::{QueryRunner, StatementRunner, TableLoader};
use std::fmt::Write as _;

/// `rows` lines of id, name, score, day, active.
fn reviews_csv(rows: usize) -> String {
    let mut csv = String::from("id,name,score,day,active\n");
    for i in 1..=rows {
        writeln!(
            csv,
            "{},reviewer {},{}.5,2024-05-{:02},{}",
            i,
            i,
            i % 5,
            (i % 28) + 1,
            i % 2 == 0
        )
        .unwrap();
    }
    csv
}

#[tokio::test]
async fn test_load_then_select_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let pool = sqlite_pool(&dir).await;
    let source = write_file(&dir, "reviews.csv", &reviews_csv(25));

    let summary = TableLoader::new(pool.clone())
        .with_batch_size(10)
        .load(&source, "Reviews", UploadMode::Replace)
        .await
        .unwrap();
    assert_eq!(summary.rows, 25);
    assert_eq!(summary.columns, 5);
    assert_eq!(summary.batches, 3);

    let expected = read_csv(&source, b',').unwrap();
    let loaded = QueryRunner::new(pool.clone())
        .fetch("SELECT * FROM Reviews ORDER BY id")
        .await
        .unwrap();

    assert_eq!(loaded.row_count(), 25);
    assert_eq!(loaded.column_count(), 5);
    assert_eq!(loaded.columns(), expected.columns());
    assert_eq!(loaded.rows(), expected.rows());
}

#[tokio::test]
async fn test_inferred_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_file(&dir, "reviews.csv", &reviews_csv(3));

    let dataset = read_csv(&source, b',').unwrap();
    let kinds: Vec<ColumnKind> = dataset.columns().iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ColumnKind::Integer,
            ColumnKind::Text,
            ColumnKind::Float,
            ColumnKind::Date,
            ColumnKind::Boolean,
        ]
    );
}

#[tokio::test]
async fn test_append_then_replace() {
    let dir = tempfile::tempdir().unwrap();
    let pool = sqlite_pool(&dir).await;
    let source = write_file(&dir, "reviews.csv", &reviews_csv(4));
    let loader = TableLoader::new(pool.clone());
    let queries = QueryRunner::new(pool.clone());

    loader.load(&source, "Reviews", UploadMode::Append).await.unwrap();
    loader.load(&source, "Reviews", UploadMode::Append).await.unwrap();
    assert_eq!(queries.fetch("SELECT * FROM Reviews").await.unwrap().row_count(), 8);

    loader.load(&source, "Reviews", UploadMode::Replace).await.unwrap();
    assert_eq!(queries.fetch("SELECT * FROM Reviews").await.unwrap().row_count(), 4);
}

#[tokio::test]
async fn test_failed_batch_keeps_earlier_batches() {
    let dir = tempfile::tempdir().unwrap();
    let pool = sqlite_pool(&dir).await;

    StatementRunner::new(pool.clone())
        .run(&["CREATE TABLE Items (id INTEGER PRIMARY KEY, name TEXT)".into()])
        .await
        .unwrap();

    // Row 12 repeats id 3, so the second batch of 10 fails
    let mut csv = String::from("id,name\n");
    for i in 1..=15 {
        let id = if i == 12 { 3 } else { i };
        writeln!(csv, "{},item {}", id, i).unwrap();
    }
    let source = write_file(&dir, "items.csv", &csv);

    let err = TableLoader::new(pool.clone())
        .with_batch_size(10)
        .load(&source, "Items", UploadMode::Append)
        .await
        .unwrap_err();
    match &err {
        EtlError::Load { table, message } => {
            assert_eq!(table, "Items");
            assert!(message.to_lowercase().contains("unique"));
        }
        other => panic!("expected load error, got {other:?}"),
    }

    let remaining = QueryRunner::new(pool.clone())
        .fetch("SELECT id FROM Items ORDER BY id")
        .await
        .unwrap();
    assert_eq!(remaining.row_count(), 10);
    assert_eq!(remaining.get(9, "id"), Some(&Value::Int(10)));
}

#[tokio::test]
async fn test_ragged_source_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let pool = sqlite_pool(&dir).await;
    let source = write_file(&dir, "ragged.csv", "a,b\n1,2\n3\n");

    let err = TableLoader::new(pool.clone())
        .load(&source, "Ragged", UploadMode::Replace)
        .await
        .unwrap_err();
    assert!(matches!(err, EtlError::Load { ref table, .. } if table == "Ragged"));
    assert!(!err.is_fatal());

    // Nothing was created
    let tables = QueryRunner::new(pool)
        .fetch("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'Ragged'")
        .await
        .unwrap();
    assert!(tables.is_empty());
}

#[tokio::test]
async fn test_missing_source_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let pool = sqlite_pool(&dir).await;

    let err = TableLoader::new(pool)
        .load(dir.path().join("nope.csv"), "T", UploadMode::Append)
        .await
        .unwrap_err();
    assert!(matches!(err, EtlError::Load { .. }));
}

#[tokio::test]
async fn test_nulls_and_quoted_identifiers() {
    let dir = tempfile::tempdir().unwrap();
    let pool = sqlite_pool(&dir).await;
    let source = write_file(
        &dir,
        "odd.csv",
        "order id,\"select\",note\n1,,hello\n2,2024-01-02,\n",
    );

    TableLoader::new(pool.clone())
        .load(&source, "odd table", UploadMode::Replace)
        .await
        .unwrap();

    let result = QueryRunner::new(pool)
        .fetch("SELECT * FROM \"odd table\" ORDER BY \"order id\"")
        .await
        .unwrap();
    assert_eq!(result.column_names(), vec!["order id", "select", "note"]);
    assert_eq!(result.get(0, "select"), Some(&Value::Null));
    assert_eq!(result.get(1, "note"), Some(&Value::Null));
    assert_eq!(result.get(0, "note"), Some(&Value::from("hello")));
}
