//! Shared application state and its assembly from configuration

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use core_kernel::{Clock, PortError, SystemClock};
use domain_claims::ports::mock::{MockClaimStore, MockDeliveryTracker, MockPayerRoutes, MockStrategyRules};
use domain_claims::{AdjudicationSource, ClaimStore, DeliveryTracker, EventSink, PayerRouteStore, StrategyRulesStore};
use domain_reconciliation::adapters::{
    FhirAdjudicationSource, PhaxioDeliveryTracker, TemplateComplaintGenerator,
    TemplateDraftGenerator, TracingEventSink, WebhookEventSink,
};
use domain_reconciliation::{
    AdjudicationPoller, Reconciler, ReconcilerConfig, ReconcilerPorts, ReviewService,
    TransmissionMonitor,
};
use infra_db::{
    create_pool, run_migrations, DatabaseConfig, DatabaseError, PostgresClaimStore,
    PostgresPayerRoutes, PostgresStrategyRules,
};

use crate::config::{AppConfig, StoreBackend};

/// Failure while wiring the application together
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Database setup failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Adapter setup failed: {0}")]
    Adapter(#[from] PortError),
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub claims: Arc<dyn ClaimStore>,
    pub rules: Arc<dyn StrategyRulesStore>,
    pub routes: Arc<dyn PayerRouteStore>,
    pub reconciler: Arc<Reconciler>,
    pub review: Arc<ReviewService>,
    pub clock: Arc<dyn Clock>,
    pub omnibus_min_claims: usize,
}

impl AppState {
    /// Builds the reconciler and review service over one set of ports
    pub fn assemble(
        ports: ReconcilerPorts,
        sources: Vec<Arc<dyn AdjudicationSource>>,
        tracker: Arc<dyn DeliveryTracker>,
        clock: Arc<dyn Clock>,
        config: ReconcilerConfig,
    ) -> Self {
        let poller = AdjudicationPoller::new(sources, config.poll_timeout())
            .with_synthetic_fallback(config.synthetic_fallback);
        let monitor = TransmissionMonitor::new(tracker, config.delivery_timeout());
        let review = ReviewService::new(
            ports.claims.clone(),
            ports.rules.clone(),
            ports.routes.clone(),
            ports.complaints.clone(),
            ports.events.clone(),
            clock.clone(),
        );

        Self {
            claims: ports.claims.clone(),
            rules: ports.rules.clone(),
            routes: ports.routes.clone(),
            reconciler: Arc::new(Reconciler::new(ports, poller, monitor, clock.clone(), config)),
            review: Arc::new(review),
            clock,
            omnibus_min_claims: domain_reconciliation::DEFAULT_OMNIBUS_MIN_CLAIMS,
        }
    }

    pub fn with_omnibus_min_claims(mut self, min_claims: usize) -> Self {
        self.omnibus_min_claims = min_claims;
        self
    }

    /// Wires stores and adapters as the configuration asks
    pub async fn from_config(config: &AppConfig) -> Result<Self, BootstrapError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let (claims, rules, routes): (
            Arc<dyn ClaimStore>,
            Arc<dyn StrategyRulesStore>,
            Arc<dyn PayerRouteStore>,
        ) = match config.store {
            StoreBackend::Postgres => {
                let pool = create_pool(DatabaseConfig::new(&config.database_url)).await?;
                run_migrations(&pool).await?;
                (
                    Arc::new(PostgresClaimStore::new(pool.clone())),
                    Arc::new(PostgresStrategyRules::new(pool.clone())),
                    Arc::new(PostgresPayerRoutes::new(pool).with_default_fax(&config.default_fax)),
                )
            }
            StoreBackend::Memory => {
                warn!("Using in-memory stores; claims are lost on restart");
                (
                    Arc::new(MockClaimStore::new()),
                    Arc::new(MockStrategyRules::new()),
                    Arc::new(MockPayerRoutes::new(&config.default_fax)),
                )
            }
        };

        let sources = config
            .fhir
            .ordered()
            .map(|source| {
                FhirAdjudicationSource::new(source.adapter_config())
                    .map(|adapter| Arc::new(adapter) as Arc<dyn AdjudicationSource>)
            })
            .collect::<Result<Vec<_>, _>>()?;
        if sources.is_empty() && !config.reconciler.synthetic_fallback {
            warn!("No adjudication source configured; submitted claims will not progress");
        }

        let tracker: Arc<dyn DeliveryTracker> = match &config.fax {
            Some(fax) => Arc::new(PhaxioDeliveryTracker::new(fax.clone())?),
            None => {
                warn!("No fax status API configured; deliveries stay pending");
                Arc::new(MockDeliveryTracker::new())
            }
        };

        let events: Arc<dyn EventSink> = match &config.events_webhook_url {
            Some(url) => Arc::new(WebhookEventSink::new(
                url,
                config.reconciler.collaborator_timeout(),
            )?),
            None => Arc::new(TracingEventSink),
        };

        let ports = ReconcilerPorts {
            claims,
            rules,
            routes,
            drafts: Arc::new(TemplateDraftGenerator::new(clock.clone())),
            complaints: Arc::new(TemplateComplaintGenerator),
            events,
        };

        info!(
            store = ?config.store,
            sources = sources.len(),
            concurrency = config.reconciler.effective_concurrency(),
            "Reconciler assembled"
        );

        Ok(Self::assemble(ports, sources, tracker, clock, config.reconciler.clone())
            .with_omnibus_min_claims(config.omnibus_min_claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_needs_no_database() {
        let config = AppConfig {
            store: StoreBackend::Memory,
            omnibus_min_claims: 5,
            ..AppConfig::default()
        };
        let state = AppState::from_config(&config).await.unwrap();
        assert_eq!(state.omnibus_min_claims, 5);
        assert!(state.claims.list_claims().await.unwrap().is_empty());
    }
}
