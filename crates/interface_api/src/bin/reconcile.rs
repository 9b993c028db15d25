//! Appeals Reconciler - one-shot batch binary
//!
//! Runs a single `reconcile()` batch with the same configuration as the API
//! server and prints the report as JSON on stdout. Intended for cron.
//!
//! ```bash
//! APPEALS_DATABASE_URL=postgres://localhost/appeals cargo run --bin appeals-reconcile
//! ```
//!
//! Exits non-zero only when the batch could not start; per-claim failures are
//! part of the report.

use anyhow::Context;

use interface_api::{config::AppConfig, telemetry, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    telemetry::init_tracing(&config.log_level, config.json_logs);

    let state = AppState::from_config(&config)
        .await
        .context("failed to assemble application state")?;

    let report = state
        .reconciler
        .reconcile()
        .await
        .context("reconciliation batch failed to start")?;

    tracing::info!(
        processed = report.processed,
        transitions = report.transitions.len(),
        failures = report.failures.len(),
        deferred = report.deferred.len(),
        elapsed_ms = report.elapsed_ms,
        "Reconciliation batch complete"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
