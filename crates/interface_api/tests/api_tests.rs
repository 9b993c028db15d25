//! Router tests over in-memory ports

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

use core_kernel::{ClaimId, Clock, FixedClock};
use domain_claims::ports::mock::{
    MockAdjudicationSource, MockClaimStore, MockDeliveryTracker, MockDraftGenerator,
    MockPayerRoutes, MockStrategyRules, RecordingEventSink,
};
use domain_claims::{AdjudicationSource, Claim, ClaimStatus, ClaimStore};
use domain_reconciliation::adapters::TemplateComplaintGenerator;
use domain_reconciliation::{ReconcileReport, ReconcilerConfig, ReconcilerPorts};
use interface_api::dto::claims::{ClaimResponse, ClaimSummary};
use interface_api::dto::review::{FollowUpResponse, OmnibusGroupResponse};
use interface_api::dto::rules::{RouteResponse, RuleResponse};
use interface_api::{create_router, AppState};
use test_utils::{RouteFixtures, TemporalFixtures, TestClaimBuilder, TestReportBuilder};

struct Harness {
    server: TestServer,
    claims: Arc<MockClaimStore>,
    source: Arc<MockAdjudicationSource>,
}

async fn harness_at(seed: Vec<Claim>, now: chrono::DateTime<chrono::Utc>) -> Harness {
    let claims = Arc::new(MockClaimStore::with_claims(seed).await);
    let source = Arc::new(MockAdjudicationSource::new("availity"));
    let ports = ReconcilerPorts {
        claims: claims.clone(),
        rules: Arc::new(MockStrategyRules::new()),
        routes: Arc::new(MockPayerRoutes::with_routes(vec![RouteFixtures::aetna()]).await),
        drafts: Arc::new(MockDraftGenerator::new()),
        complaints: Arc::new(TemplateComplaintGenerator),
        events: Arc::new(RecordingEventSink::new()),
    };
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now));
    let sources: Vec<Arc<dyn AdjudicationSource>> = vec![source.clone()];
    let config = ReconcilerConfig::default()
        .with_poll_timeout(std::time::Duration::from_millis(200));
    let state = AppState::assemble(
        ports,
        sources,
        Arc::new(MockDeliveryTracker::new()),
        clock,
        config,
    );

    Harness {
        server: TestServer::new(create_router(state)).unwrap(),
        claims,
        source,
    }
}

async fn harness() -> Harness {
    harness_at(vec![], TemporalFixtures::within_urgent_window()).await
}

fn reviewer() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-reviewer"),
        HeaderValue::from_static("dr.okafor"),
    )
}

fn fusion_denial() -> Value {
    json!({
        "payer": "Aetna",
        "procedure": "Lumbar Spinal Fusion",
        "reason_code": "CO-50",
        "stake_amount": "18500",
        "priority": "urgent"
    })
}

async fn register(h: &Harness, body: Value) -> ClaimResponse {
    let response = h.server.post("/api/v1/claims").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<ClaimResponse>()
}

#[tokio::test]
async fn test_health_and_readiness() {
    let h = harness().await;

    let health = h.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "healthy");

    let ready = h.server.get("/health/ready").await;
    ready.assert_status_ok();
    assert_eq!(ready.json::<Value>()["checks"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_register_claim_starts_new() {
    let h = harness().await;
    let claim = register(&h, fusion_denial()).await;

    assert_eq!(claim.status, ClaimStatus::New);
    assert_eq!(claim.stake, dec!(18500));
    assert_eq!(claim.priority, "urgent");
    assert_eq!(claim.created_at, TemporalFixtures::within_urgent_window());
    assert!(claim.due_at.is_none());
}

#[tokio::test]
async fn test_register_claim_validation() {
    let h = harness().await;

    let mut missing_payer = fusion_denial();
    missing_payer["payer"] = json!("");
    let response = h.server.post("/api/v1/claims").json(&missing_payer).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["error"], "validation_error");

    let mut bad_priority = fusion_denial();
    bad_priority["priority"] = json!("someday");
    h.server
        .post("/api/v1/claims")
        .json(&bad_priority)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_claim_is_404() {
    let h = harness().await;
    h.server
        .get(&format!("/api/v1/claims/{}", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lifecycle_through_the_api() {
    let h = harness().await;
    let registered = register(&h, fusion_denial()).await;
    let claim_url = format!("/api/v1/claims/{}", registered.id);

    // Urgent denial is drafted on the first batch
    let report = h.server.post("/api/v1/reconcile").await.json::<ReconcileReport>();
    assert_eq!(report.processed, 1);
    assert_eq!(report.transitions.len(), 1);
    assert_eq!(report.transitions[0].to, ClaimStatus::Drafted);

    let (name, value) = reviewer();
    let edited = h
        .server
        .put(&format!("{claim_url}/draft"))
        .add_header(name.clone(), value.clone())
        .json(&json!({ "text": "Peer-reviewed outcomes support fusion at L4-L5." }))
        .await;
    edited.assert_status_ok();
    let edited = edited.json::<ClaimResponse>();
    assert_eq!(edited.status, ClaimStatus::Drafted);
    assert_eq!(
        edited.audit.last().map(|e| e.actor.as_str()),
        Some("reviewer:dr.okafor")
    );

    let sent = h
        .server
        .post(&format!("{claim_url}/transmission"))
        .add_header(name, value)
        .json(&json!({ "transmission_ref": "FAX-2001" }))
        .await;
    sent.assert_status_ok();
    assert_eq!(sent.json::<ClaimResponse>().status, ClaimStatus::Submitted);

    let stored = h
        .claims
        .get_claim(ClaimId::from_uuid(registered.id))
        .await
        .unwrap();
    h.source
        .respond(stored.payer_reference(), TestReportBuilder::approved().build())
        .await;

    let report = h.server.post("/api/v1/reconcile").await.json::<ReconcileReport>();
    assert_eq!(report.transitions.len(), 1);
    assert_eq!(report.transitions[0].to, ClaimStatus::Settled);

    let settled = h.server.get(&claim_url).await.json::<ClaimResponse>();
    assert_eq!(settled.status, ClaimStatus::Settled);
    assert_eq!(settled.recovered_amount, Some(dec!(18500)));
}

#[tokio::test]
async fn test_illegal_review_action_is_conflict() {
    let h = harness().await;
    let claim = register(&h, fusion_denial()).await;

    let response = h
        .server
        .post(&format!("/api/v1/claims/{}/refinement", claim.id))
        .json(&json!({ "narrative_ref": "narratives/fusion-v2" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "conflict");
}

#[tokio::test]
async fn test_rules_upsert_and_list() {
    let h = harness().await;

    let saved = h
        .server
        .put("/api/v1/rules")
        .json(&json!({ "payer": "Cigna", "reason_code": "co-197", "strategy": "STEP_THERAPY" }))
        .await;
    saved.assert_status_ok();
    let saved = saved.json::<RuleResponse>();
    assert_eq!(saved.reason_code, "CO-197");
    assert_eq!(saved.provenance, "manual");

    let rules = h.server.get("/api/v1/rules").await.json::<Vec<RuleResponse>>();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].strategy, "STEP_THERAPY");
}

#[tokio::test]
async fn test_routes_resolve_by_alias() {
    let h = harness().await;

    h.server
        .put("/api/v1/routes")
        .json(&json!({
            "payer": "UnitedHealthcare",
            "fax": "1-866-555-0101",
            "department": "Appeals Unit",
            "aliases": ["UHC"]
        }))
        .await
        .assert_status_ok();

    let route = h
        .server
        .get("/api/v1/routes/resolve")
        .add_query_param("payer", "UHC Community Plan")
        .await
        .json::<RouteResponse>();
    assert_eq!(route.fax, "1-866-555-0101");
    assert_eq!(route.provenance, "directory");

    let routes = h.server.get("/api/v1/routes").await.json::<Vec<RouteResponse>>();
    assert_eq!(routes.len(), 2);
}

#[tokio::test]
async fn test_learn_from_edit_records_rule() {
    let h = harness().await;
    let claim = register(&h, fusion_denial()).await;

    let rule = h
        .server
        .post(&format!("/api/v1/claims/{}/learn", claim.id))
        .json(&json!({ "text": "Cite the surgeon's two-year fusion outcomes." }))
        .await;
    rule.assert_status_ok();
    let rule = rule.json::<RuleResponse>();
    assert_eq!(rule.payer, "Aetna");
    assert_eq!(rule.provenance, "physician_edit");
}

#[tokio::test]
async fn test_omnibus_groups_repeat_denials() {
    let h = harness().await;
    register(&h, fusion_denial()).await;
    register(&h, fusion_denial()).await;

    let groups = h
        .server
        .get("/api/v1/omnibus")
        .add_query_param("min_claims", 2)
        .await
        .json::<Vec<OmnibusGroupResponse>>();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].claim_count, 2);
    assert_eq!(groups[0].total_stake, dec!(37000));

    let none = h.server.get("/api/v1/omnibus").await.json::<Vec<OmnibusGroupResponse>>();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_follow_ups_list_stale_submissions() {
    let stale = TestClaimBuilder::submitted().build();
    let h = harness_at(vec![stale.clone()], TemporalFixtures::after_standard_window()).await;

    let follow_ups = h
        .server
        .get("/api/v1/follow-ups")
        .await
        .json::<Vec<FollowUpResponse>>();
    assert_eq!(follow_ups.len(), 1);
    assert_eq!(follow_ups[0].claim_id, *stale.id.as_uuid());
    assert!(follow_ups[0].days_outstanding >= 3);

    let claims = h
        .server
        .get("/api/v1/claims")
        .add_query_param("status", "SUBMITTED")
        .await
        .json::<Vec<ClaimSummary>>();
    assert_eq!(claims.len(), 1);
}
