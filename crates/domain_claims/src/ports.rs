//! Appeal lifecycle ports
//!
//! Every collaborator the reconciler needs is reached through one of these
//! traits. Production adapters live in `infra_db` (stores) and
//! `domain_reconciliation` (HTTP sources, templates, event sinks); the
//! in-memory adapters in [`mock`] back unit tests and the memory store backend.
//!
//! ```rust,ignore
//! let claims: Arc<dyn ClaimStore> = match config.store {
//!     StoreBackend::Postgres => Arc::new(PostgresClaimStore::new(pool)),
//!     StoreBackend::Memory => Arc::new(MockClaimStore::new()),
//! };
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{ClaimId, DomainPort, HealthCheckable, PortError};

use crate::adjudication::{AdjudicationReport, ReasonCode};
use crate::claim::{AppealTier, Claim, DeliveryStatus, TransmissionRef};
use crate::events::ClaimEvent;
use crate::routing::PayerRoute;
use crate::strategy::{AppealStrategy, StrategyRule};

/// Claim persistence
#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    /// Loads every claim whose status is not terminal
    async fn load_open_claims(&self) -> Result<Vec<Claim>, PortError>;

    /// Loads every claim, terminal ones included
    async fn list_claims(&self) -> Result<Vec<Claim>, PortError>;

    /// Retrieves a claim by ID, or `PortError::NotFound`
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// Persists the full claim state atomically
    ///
    /// The write only applies if the stored claim is still at `claim.version`;
    /// otherwise nothing is written and `PortError::Conflict` is returned. A
    /// successful save advances the stored version by one. Audit entries
    /// already stored are never rewritten; only new ones are appended.
    async fn save_claim(&self, claim: &Claim) -> Result<(), PortError>;

    /// Stores a newly detected claim; `PortError::Conflict` if the ID exists
    async fn insert_claim(&self, claim: &Claim) -> Result<(), PortError>;
}

/// Learned (payer, reason code) -> strategy table
#[async_trait]
pub trait StrategyRulesStore: DomainPort + HealthCheckable {
    /// Exact payer rule, then wildcard rule, then the default strategy
    async fn lookup(&self, payer: &str, reason_code: &ReasonCode)
        -> Result<AppealStrategy, PortError>;

    /// Replaces the rule for the rule's (payer, reason code) key
    async fn upsert(&self, rule: StrategyRule) -> Result<(), PortError>;

    async fn list_rules(&self) -> Result<Vec<StrategyRule>, PortError>;
}

/// Payer transmission directory
#[async_trait]
pub trait PayerRouteStore: DomainPort + HealthCheckable {
    /// Route for the payer, or the default fallback route
    async fn resolve(&self, payer: &str) -> Result<PayerRoute, PortError>;

    /// Replaces the route keyed by the route's payer name
    async fn upsert_route(&self, route: PayerRoute) -> Result<(), PortError>;

    async fn list_routes(&self) -> Result<Vec<PayerRoute>, PortError>;
}

/// A claim-status source (FHIR vendor)
#[async_trait]
pub trait AdjudicationSource: DomainPort {
    /// Label recorded as the report source
    fn name(&self) -> &str;

    async fn fetch(&self, payer: &str, claim_ref: &str) -> Result<AdjudicationReport, PortError>;
}

/// Fax transmission status lookup
#[async_trait]
pub trait DeliveryTracker: DomainPort {
    async fn status(&self, transmission_ref: &TransmissionRef) -> Result<DeliveryStatus, PortError>;
}

/// Produces appeal text
#[async_trait]
pub trait DraftGenerator: DomainPort {
    async fn generate_appeal(
        &self,
        claim: &Claim,
        strategy: &AppealStrategy,
        tier: AppealTier,
    ) -> Result<String, PortError>;
}

/// Receives lifecycle events
#[async_trait]
pub trait EventSink: DomainPort {
    async fn emit(&self, event: ClaimEvent) -> Result<(), PortError>;
}

/// Produces regulatory correspondence
#[async_trait]
pub trait ComplaintGenerator: DomainPort {
    /// Notice of violation sent on escalation to `EscalatedL1`
    async fn violation_notice(&self, claim: &Claim, today: DateTime<Utc>)
        -> Result<String, PortError>;

    /// Complaint filed on escalation to `CmsEscalated`
    async fn cms_complaint(&self, claim: &Claim, today: DateTime<Utc>) -> Result<String, PortError>;
}

/// In-memory adapters
///
/// Used by tests across the workspace and by the `memory` store backend.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use core_kernel::HealthCheckResult;
    use tokio::sync::RwLock;

    use crate::routing::{resolve_route, DEFAULT_FAX};
    use crate::strategy::resolve_strategy;

    /// In-memory claim store
    #[derive(Debug, Default)]
    pub struct MockClaimStore {
        claims: Arc<RwLock<HashMap<ClaimId, Claim>>>,
        failing_saves: Arc<RwLock<HashSet<ClaimId>>>,
        saves: AtomicUsize,
    }

    impl MockClaimStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with claims for testing
        pub async fn with_claims(claims: Vec<Claim>) -> Self {
            let store = Self::new();
            {
                let mut map = store.claims.write().await;
                for claim in claims {
                    map.insert(claim.id, claim);
                }
            }
            store
        }

        /// Makes every save of `id` fail with a connection error
        pub async fn fail_saves_for(&self, id: ClaimId) {
            self.failing_saves.write().await.insert(id);
        }

        /// Number of successful saves so far
        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    impl DomainPort for MockClaimStore {}

    #[async_trait]
    impl HealthCheckable for MockClaimStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-claim-store")
        }
    }

    #[async_trait]
    impl ClaimStore for MockClaimStore {
        async fn load_open_claims(&self) -> Result<Vec<Claim>, PortError> {
            let mut claims: Vec<Claim> = self
                .claims
                .read()
                .await
                .values()
                .filter(|c| !c.status.is_terminal())
                .cloned()
                .collect();
            claims.sort_by_key(|c| c.id);
            Ok(claims)
        }

        async fn list_claims(&self) -> Result<Vec<Claim>, PortError> {
            let mut claims: Vec<Claim> = self.claims.read().await.values().cloned().collect();
            claims.sort_by_key(|c| c.id);
            Ok(claims)
        }

        async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
            self.claims
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn save_claim(&self, claim: &Claim) -> Result<(), PortError> {
            if self.failing_saves.read().await.contains(&claim.id) {
                return Err(PortError::connection(format!(
                    "simulated write failure for {}",
                    claim.id
                )));
            }
            let mut claims = self.claims.write().await;
            let stored = claims
                .get_mut(&claim.id)
                .ok_or_else(|| PortError::not_found("Claim", claim.id))?;
            if stored.version != claim.version {
                return Err(PortError::Conflict {
                    message: format!(
                        "claim {} changed since it was loaded (version {} != {})",
                        claim.id, stored.version, claim.version
                    ),
                });
            }
            let mut next = claim.clone();
            next.version += 1;
            *stored = next;
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn insert_claim(&self, claim: &Claim) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            if claims.contains_key(&claim.id) {
                return Err(PortError::Conflict {
                    message: format!("claim {} already exists", claim.id),
                });
            }
            claims.insert(claim.id, claim.clone());
            Ok(())
        }
    }

    /// In-memory strategy rules
    #[derive(Debug, Default)]
    pub struct MockStrategyRules {
        rules: Arc<RwLock<Vec<StrategyRule>>>,
        unavailable: AtomicBool,
    }

    impl MockStrategyRules {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_rules(rules: Vec<StrategyRule>) -> Self {
            let store = Self::new();
            for rule in rules {
                // upsert on an in-memory vec cannot fail while available
                let _ = store.upsert(rule).await;
            }
            store
        }

        /// Makes every call fail as if storage were down
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "strategy_rules".to_string(),
                });
            }
            Ok(())
        }
    }

    impl DomainPort for MockStrategyRules {}

    #[async_trait]
    impl HealthCheckable for MockStrategyRules {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-strategy-rules")
        }
    }

    #[async_trait]
    impl StrategyRulesStore for MockStrategyRules {
        async fn lookup(
            &self,
            payer: &str,
            reason_code: &ReasonCode,
        ) -> Result<AppealStrategy, PortError> {
            self.check_available()?;
            let rules = self.rules.read().await;
            Ok(resolve_strategy(&rules, payer, reason_code))
        }

        async fn upsert(&self, rule: StrategyRule) -> Result<(), PortError> {
            self.check_available()?;
            let mut rules = self.rules.write().await;
            match rules
                .iter_mut()
                .find(|existing| existing.same_key(&rule.payer, &rule.reason_code))
            {
                Some(existing) => *existing = rule,
                None => rules.push(rule),
            }
            Ok(())
        }

        async fn list_rules(&self) -> Result<Vec<StrategyRule>, PortError> {
            self.check_available()?;
            Ok(self.rules.read().await.clone())
        }
    }

    /// In-memory payer directory
    #[derive(Debug)]
    pub struct MockPayerRoutes {
        routes: Arc<RwLock<Vec<PayerRoute>>>,
        default_fax: String,
    }

    impl Default for MockPayerRoutes {
        fn default() -> Self {
            Self::new(DEFAULT_FAX)
        }
    }

    impl MockPayerRoutes {
        pub fn new(default_fax: impl Into<String>) -> Self {
            Self {
                routes: Arc::new(RwLock::new(Vec::new())),
                default_fax: default_fax.into(),
            }
        }

        pub async fn with_routes(routes: Vec<PayerRoute>) -> Self {
            let store = Self::default();
            *store.routes.write().await = routes;
            store
        }
    }

    impl DomainPort for MockPayerRoutes {}

    #[async_trait]
    impl HealthCheckable for MockPayerRoutes {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-payer-routes")
        }
    }

    #[async_trait]
    impl PayerRouteStore for MockPayerRoutes {
        async fn resolve(&self, payer: &str) -> Result<PayerRoute, PortError> {
            let routes = self.routes.read().await;
            Ok(resolve_route(&routes, payer, &self.default_fax, Utc::now()))
        }

        async fn upsert_route(&self, route: PayerRoute) -> Result<(), PortError> {
            let mut routes = self.routes.write().await;
            match routes
                .iter_mut()
                .find(|existing| existing.payer.eq_ignore_ascii_case(&route.payer))
            {
                Some(existing) => *existing = route,
                None => routes.push(route),
            }
            Ok(())
        }

        async fn list_routes(&self) -> Result<Vec<PayerRoute>, PortError> {
            Ok(self.routes.read().await.clone())
        }
    }

    /// Scripted behaviour of a mock source for one claim reference
    #[derive(Debug, Clone)]
    pub enum Scripted {
        Report(AdjudicationReport),
        Fail,
        /// Sleeps before answering pending, for timeout tests
        Hang(Duration),
    }

    /// Scripted adjudication source
    ///
    /// Unscripted references fail with `ServiceUnavailable`.
    #[derive(Debug)]
    pub struct MockAdjudicationSource {
        name: String,
        script: Arc<RwLock<HashMap<String, Scripted>>>,
        calls: AtomicUsize,
    }

    impl MockAdjudicationSource {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                script: Arc::new(RwLock::new(HashMap::new())),
                calls: AtomicUsize::new(0),
            }
        }

        pub async fn script(&self, claim_ref: impl Into<String>, behaviour: Scripted) {
            self.script.write().await.insert(claim_ref.into(), behaviour);
        }

        pub async fn respond(&self, claim_ref: impl Into<String>, report: AdjudicationReport) {
            self.script(claim_ref, Scripted::Report(report)).await;
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DomainPort for MockAdjudicationSource {}

    #[async_trait]
    impl AdjudicationSource for MockAdjudicationSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch(&self, _payer: &str, claim_ref: &str) -> Result<AdjudicationReport, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let behaviour = self.script.read().await.get(claim_ref).cloned();
            match behaviour {
                Some(Scripted::Report(report)) => Ok(report),
                Some(Scripted::Hang(delay)) => {
                    tokio::time::sleep(delay).await;
                    Ok(AdjudicationReport::new(
                        crate::adjudication::AdjudicationOutcome::Pending,
                        crate::adjudication::ReportSource::Vendor(self.name.clone()),
                    ))
                }
                Some(Scripted::Fail) | None => Err(PortError::ServiceUnavailable {
                    service: self.name.clone(),
                }),
            }
        }
    }

    /// Scripted delivery tracker; unknown references are pending
    #[derive(Debug, Default)]
    pub struct MockDeliveryTracker {
        statuses: Arc<RwLock<HashMap<String, DeliveryStatus>>>,
        unavailable: AtomicBool,
    }

    impl MockDeliveryTracker {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn set_status(&self, transmission_ref: impl Into<String>, status: DeliveryStatus) {
            self.statuses.write().await.insert(transmission_ref.into(), status);
        }

        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }
    }

    impl DomainPort for MockDeliveryTracker {}

    #[async_trait]
    impl DeliveryTracker for MockDeliveryTracker {
        async fn status(&self, transmission_ref: &TransmissionRef) -> Result<DeliveryStatus, PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(PortError::connection("fax status service unreachable"));
            }
            Ok(self
                .statuses
                .read()
                .await
                .get(transmission_ref.as_str())
                .copied()
                .unwrap_or(DeliveryStatus::Pending))
        }
    }

    /// Draft generator producing short deterministic text
    #[derive(Debug, Default)]
    pub struct MockDraftGenerator {
        failing: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockDraftGenerator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DomainPort for MockDraftGenerator {}

    #[async_trait]
    impl DraftGenerator for MockDraftGenerator {
        async fn generate_appeal(
            &self,
            claim: &Claim,
            strategy: &AppealStrategy,
            tier: AppealTier,
        ) -> Result<String, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(PortError::internal("draft generator offline"));
            }
            Ok(format!(
                "Level {} appeal to {} using {}",
                tier.number(),
                claim.payer,
                strategy
            ))
        }
    }

    /// Event sink that keeps every event
    #[derive(Debug, Default)]
    pub struct RecordingEventSink {
        events: Arc<RwLock<Vec<ClaimEvent>>>,
        failing: AtomicBool,
    }

    impl RecordingEventSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// While set, every emit fails as if the receiver were down
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub async fn events(&self) -> Vec<ClaimEvent> {
            self.events.read().await.clone()
        }
    }

    impl DomainPort for RecordingEventSink {}

    #[async_trait]
    impl EventSink for RecordingEventSink {
        async fn emit(&self, event: ClaimEvent) -> Result<(), PortError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "event receiver".to_string(),
                });
            }
            self.events.write().await.push(event);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use crate::audit::Actor;
    use crate::claim::Priority;
    use crate::strategy::{RuleProvenance, WILDCARD};
    use core_kernel::Money;
    use rust_decimal_macros::dec;

    fn claim() -> Claim {
        Claim::new(
            "Cigna",
            "MRI",
            ReasonCode::new("CO-197"),
            Money::usd(dec!(18500)),
            Priority::Urgent,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_claim_store_insert_conflict_and_failures() {
        let store = MockClaimStore::new();
        let c = claim();
        store.insert_claim(&c).await.unwrap();
        assert!(matches!(
            store.insert_claim(&c).await,
            Err(PortError::Conflict { .. })
        ));

        store.fail_saves_for(c.id).await;
        assert!(store.save_claim(&c).await.unwrap_err().is_transient());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_save_is_rejected_and_keeps_history() {
        let store = MockClaimStore::new();
        let c = claim();
        store.insert_claim(&c).await.unwrap();

        let mut reviewer_copy = store.get_claim(c.id).await.unwrap();
        let mut batch_copy = reviewer_copy.clone();
        reviewer_copy.note("reviewer note", Actor::reviewer("dr.okafor"), Utc::now());
        store.save_claim(&reviewer_copy).await.unwrap();

        batch_copy.note("batch note", Actor::Reconciler, Utc::now());
        assert!(matches!(
            store.save_claim(&batch_copy).await,
            Err(PortError::Conflict { .. })
        ));

        let stored = store.get_claim(c.id).await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.audit_log.len(), 1);
        assert_eq!(stored.audit_log[0].reason, "reviewer note");
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_rules_upsert_replaces_by_key() {
        let rules = MockStrategyRules::new();
        let code = ReasonCode::new("CO-197");
        for strategy in [AppealStrategy::PriorAuthorization, AppealStrategy::StepTherapy] {
            rules
                .upsert(StrategyRule::new(WILDCARD, code.clone(), strategy, RuleProvenance::Manual, Utc::now()))
                .await
                .unwrap();
        }
        assert_eq!(rules.list_rules().await.unwrap().len(), 1);
        assert_eq!(rules.lookup("Aetna", &code).await.unwrap(), AppealStrategy::StepTherapy);

        rules.set_unavailable(true);
        assert!(rules.lookup("Aetna", &code).await.is_err());
    }

    #[tokio::test]
    async fn test_unscripted_source_is_unavailable() {
        let source = MockAdjudicationSource::new("EPIC");
        assert!(source.fetch("Cigna", "AUTO-1").await.unwrap_err().is_transient());
        assert_eq!(source.call_count(), 1);
    }
}
