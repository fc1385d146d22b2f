#![allow(dead_code)]

use db_etl::db::{Connector, DbPool};
use db_etl::models::ConnectionSettings;
use std::path::PathBuf;
use tempfile::TempDir;

/// Open a fresh SQLite database inside `dir`.
pub async fn sqlite_pool(dir: &TempDir) -> DbPool {
    let path = dir.path().join("etl.db");
    Connector::new(ConnectionSettings::sqlite(path.to_str().unwrap()))
        .connect()
        .await
        .expect("SQLite connection should succeed")
}

pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub const CREATE_FEEDBACK: &str = "CREATE TABLE IF NOT EXISTS CustomerFeedback (
    FeedbackID INTEGER PRIMARY KEY,
    CustomerID INTEGER,
    FeedbackDate DATE,
    Comments VARCHAR(250))";

pub const POPULATE_FEEDBACK: &str = "INSERT INTO CustomerFeedback (FeedbackID, CustomerID, FeedbackDate, Comments)
VALUES
(1, 1001, '2024-05-31', 'Excellent Service'),
(2, 1002, '2024-05-26', 'Good job!'),
(3, 1003, '2024-05-24', 'Service could be improved'),
(4, 1004, '2024-05-20', 'Very Satisfied'),
(5, 1005, '2024-05-19', 'Prompt Response'),
(6, 1006, '2024-05-16', 'fast Delivery Service'),
(7, 1007, '2024-05-10', 'Friendly Staff'),
(8, 1008, '2024-05-04', 'Delayed Response'),
(9, 1009, '2024-04-28', 'Impressed with the quality of service'),
(10, 1010, '2024-04-23', 'Recommended to a friend')";
