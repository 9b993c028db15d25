//! PostgreSQL payer route directory
//!
//! Matching is done in the domain (`resolve_route`) over the whole directory,
//! which stays small enough to load per lookup.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_claims::routing::{resolve_route, DEFAULT_FAX};
use domain_claims::{PayerRoute, PayerRouteStore};

use crate::repositories::routes::{PayerRouteRow, PayerRoutesRepository};

const ADAPTER_ID: &str = "postgres-payer-routes";

#[derive(Debug, Clone)]
pub struct PostgresPayerRoutes {
    repository: PayerRoutesRepository,
    pool: PgPool,
    default_fax: String,
}

impl PostgresPayerRoutes {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PayerRoutesRepository::new(pool.clone()),
            pool,
            default_fax: DEFAULT_FAX.to_string(),
        }
    }

    /// Overrides the fax used when no directory entry matches
    pub fn with_default_fax(mut self, fax: impl Into<String>) -> Self {
        self.default_fax = fax.into();
        self
    }

    pub fn default_fax(&self) -> &str {
        &self.default_fax
    }
}

impl DomainPort for PostgresPayerRoutes {}

#[async_trait]
impl HealthCheckable for PostgresPayerRoutes {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl PayerRouteStore for PostgresPayerRoutes {
    #[instrument(skip(self))]
    async fn resolve(&self, payer: &str) -> Result<PayerRoute, PortError> {
        let routes = self.list_routes().await?;
        let route = resolve_route(&routes, payer, &self.default_fax, Utc::now());
        debug!(fax = %route.fax, provenance = route.provenance.as_str(), "Resolved payer route");
        Ok(route)
    }

    #[instrument(skip(self, route), fields(payer = %route.payer))]
    async fn upsert_route(&self, route: PayerRoute) -> Result<(), PortError> {
        self.repository.upsert(&PayerRouteRow::from(&route)).await?;
        Ok(())
    }

    async fn list_routes(&self) -> Result<Vec<PayerRoute>, PortError> {
        let rows = self.repository.list().await?;
        Ok(rows.into_iter().map(PayerRoute::from).collect())
    }
}
