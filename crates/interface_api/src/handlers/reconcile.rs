//! Batch trigger

use axum::{extract::State, Json};
use tracing::info;

use domain_reconciliation::ReconcileReport;

use crate::{error::ApiError, AppState};

/// Runs one reconciliation batch and returns its report
pub async fn run_reconcile(State(state): State<AppState>) -> Result<Json<ReconcileReport>, ApiError> {
    let report = state.reconciler.reconcile().await?;
    info!(
        processed = report.processed,
        transitions = report.transitions.len(),
        failures = report.failures.len(),
        deferred = report.deferred.len(),
        "Reconcile triggered over HTTP"
    );
    Ok(Json(report))
}
