//! db-etl - Main entry point.

use db_etl::config::Config;
use db_etl::db::Connector;
use db_etl::logging;
use db_etl::pipeline::{Pipeline, RunReport};
use std::process::ExitCode;
use tracing::{error, info};

/// Configuration problems and unreachable databases.
const EXIT_SETUP_FAILED: u8 = 2;
/// At least one step failed.
const EXIT_STEP_FAILED: u8 = 1;

fn print_summary(report: &RunReport) {
    for step in &report.steps {
        match &step.result {
            Ok(outcome) => eprintln!("[ok]     {} ({}): {}", step.name, step.kind, outcome),
            Err(e) => eprintln!("[failed] {} ({}): {}", step.name, step.kind, e),
        }
    }
    eprintln!(
        "{} step(s) succeeded, {} failed{}",
        report.succeeded_count(),
        report.failed_count(),
        if report.aborted() { ", run aborted" } else { "" }
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Config::parse_args();

    let log_file = match logging::init(&config.log_options()) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = ?log_file,
        "Starting db-etl"
    );

    let settings = match config.connection_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    let plan = match config.to_plan() {
        Ok(plan) => plan,
        Err(e) => {
            error!(error = %e, "Could not build plan");
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    let pool = match Connector::new(settings).connect().await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, suggestion = ?e.suggestion(), "Could not connect");
            eprintln!("Error: {}", e);
            if let Some(suggestion) = e.suggestion() {
                eprintln!("  hint: {}", suggestion);
            }
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    let report = Pipeline::with_options(pool.clone(), config.pipeline_options())
        .run(&plan)
        .await;
    pool.close().await;

    print_summary(&report);
    info!("Shutdown complete");

    if report.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_STEP_FAILED)
    }
}
