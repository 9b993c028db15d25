//! Port adapters backed by PostgreSQL
//!
//! Each adapter implements one `domain_claims` port on top of a repository
//! and translates `DatabaseError` into `PortError` at the boundary.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresClaimStore;
//! use domain_claims::ClaimStore;
//!
//! let store: Arc<dyn ClaimStore> = Arc::new(PostgresClaimStore::new(pool));
//! let open = store.load_open_claims().await?;
//! ```

pub mod claims;
pub mod routes;
pub mod rules;

pub use claims::PostgresClaimStore;
pub use routes::PostgresPayerRoutes;
pub use rules::PostgresStrategyRules;

use std::time::Instant;

use chrono::Utc;
use core_kernel::{AdapterHealth, HealthCheckResult};
use sqlx::PgPool;

/// Runs `SELECT 1` against the pool and reports the round trip
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}
