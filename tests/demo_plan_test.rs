mod common;

use common::sqlite_pool;
use db_etl::models::Plan;
use db_etl::pipeline::Pipeline;
use std::path::Path;

#[tokio::test]
async fn test_customer_feedback_demo_runs_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    for name in ["customer_feedback.json", "reviews.csv"] {
        std::fs::copy(demos.join(name), dir.path().join(name)).unwrap();
    }
    std::fs::create_dir(dir.path().join("out")).unwrap();

    let plan = Plan::from_file(dir.path().join("customer_feedback.json")).unwrap();
    let pool = sqlite_pool(&dir).await;
    let report = Pipeline::new(pool).run(&plan).await;

    assert!(report.all_succeeded(), "{report:?}");
    let exported =
        std::fs::read_to_string(dir.path().join("out").join("customer_feedback.csv")).unwrap();
    assert_eq!(exported.lines().count(), 10);
    assert!(exported.contains("1,1001,2024-06-05,Excellent Customer Service"));
    assert!(!exported.contains("Good job!"));
}
