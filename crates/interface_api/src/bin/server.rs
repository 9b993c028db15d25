//! Appeals Reconciler - API Server Binary
//!
//! Serves the reconcile trigger, strategy rules, payer routes and human
//! review actions over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Run against PostgreSQL
//! APPEALS_DATABASE_URL=postgres://localhost/appeals cargo run --bin appeals-api
//!
//! # Run with in-memory stores
//! APPEALS_STORE=memory cargo run --bin appeals-api
//! ```
//!
//! # Environment Variables
//!
//! * `APPEALS_HOST` - Server host (default: 0.0.0.0)
//! * `APPEALS_PORT` - Server port (default: 8080)
//! * `APPEALS_STORE` - `postgres` or `memory` (default: postgres)
//! * `APPEALS_DATABASE_URL` - PostgreSQL connection string
//! * `APPEALS_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `APPEALS_JSON_LOGS` - Emit JSON log lines (default: false)
//! * `APPEALS_FHIR__PRIMARY__NAME`, `APPEALS_FHIR__PRIMARY__BASE_URL`,
//!   `APPEALS_FHIR__PRIMARY__TOKEN` - primary claim-status vendor (and `SECONDARY`)
//! * `APPEALS_FAX__API_KEY`, `APPEALS_FAX__API_SECRET` - fax status API
//! * `APPEALS_RECONCILER__*` - batch tuning, see `ReconcilerConfig`

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;

use interface_api::{config::AppConfig, create_router, telemetry, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    telemetry::init_tracing(&config.log_level, config.json_logs);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = ?config.store,
        "Starting appeals reconciler API server"
    );

    let state = AppState::from_config(&config)
        .await
        .context("failed to assemble application state")?;
    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
