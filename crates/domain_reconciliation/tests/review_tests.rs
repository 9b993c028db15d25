//! Human review action tests

use std::sync::Arc;

use chrono::Duration;

use core_kernel::{Clock, FixedClock};
use domain_claims::ports::mock::{
    MockClaimStore, MockPayerRoutes, MockStrategyRules, RecordingEventSink,
};
use domain_claims::{
    Actor, AdjudicationOutcome, AppealStrategy, AppealTier, Claim, ClaimError, ClaimStatus,
    ClaimStore, DeliveryStatus, EventKind, NoticeKind, PayerRouteStore, ReasonCode,
    RouteProvenance, RuleProvenance, StrategyRulesStore, TransmissionRef,
};
use domain_reconciliation::adapters::TemplateComplaintGenerator;
use domain_reconciliation::{ReviewError, ReviewService};
use test_utils::{
    assert_audit_chain, assert_status, assert_transition_count, PayerFixtures, RouteFixtures,
    TemporalFixtures, TestClaimBuilder,
};

struct Harness {
    claims: Arc<MockClaimStore>,
    rules: Arc<MockStrategyRules>,
    routes: Arc<MockPayerRoutes>,
    events: Arc<RecordingEventSink>,
    service: ReviewService,
}

async fn harness(claims: Vec<Claim>) -> Harness {
    let claims = Arc::new(MockClaimStore::with_claims(claims).await);
    let rules = Arc::new(MockStrategyRules::new());
    let routes = Arc::new(MockPayerRoutes::with_routes(vec![RouteFixtures::aetna()]).await);
    let events = Arc::new(RecordingEventSink::new());
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(TemporalFixtures::within_urgent_window()));
    let service = ReviewService::new(
        claims.clone(),
        rules.clone(),
        routes.clone(),
        Arc::new(TemplateComplaintGenerator),
        events.clone(),
        clock,
    );
    Harness {
        claims,
        rules,
        routes,
        events,
        service,
    }
}

fn reviewer() -> Actor {
    Actor::reviewer("dr.chen")
}

#[tokio::test]
async fn test_register_rejects_duplicates() {
    let h = harness(vec![]).await;
    let claim = TestClaimBuilder::new().build();

    h.service.register_claim(claim.clone()).await.unwrap();
    let err = h.service.register_claim(claim).await.unwrap_err();
    assert!(matches!(err, ReviewError::Port(_)));
}

#[tokio::test]
async fn test_unknown_claim_is_not_found() {
    let h = harness(vec![]).await;
    let id = test_utils::IdFixtures::claim_id();
    let err = h.service.open_discovery(id, reviewer()).await.unwrap_err();
    assert!(matches!(err, ReviewError::ClaimNotFound(found) if found == id));
}

#[tokio::test]
async fn test_save_draft_moves_new_to_drafted() {
    let claim = TestClaimBuilder::new().build();
    let h = harness(vec![claim.clone()]).await;

    let saved = h
        .service
        .save_draft(claim.id, "Edited appeal".into(), reviewer())
        .await
        .unwrap();
    assert_status(&saved, ClaimStatus::Drafted);
    let draft = saved.draft.as_ref().unwrap();
    assert!(draft.human_edited);
    assert_eq!(draft.text, "Edited appeal");
    assert!(saved.due_at.is_some());
}

#[tokio::test]
async fn test_save_draft_in_place_adds_note() {
    let claim = TestClaimBuilder::new()
        .with_status(ClaimStatus::Drafted)
        .with_draft("Generated appeal")
        .build();
    let h = harness(vec![claim.clone()]).await;

    let saved = h
        .service
        .save_draft(claim.id, "Physician revision".into(), reviewer())
        .await
        .unwrap();
    assert_status(&saved, ClaimStatus::Drafted);
    assert_eq!(saved.audit_log.len(), 1);
    assert!(!saved.audit_log[0].is_transition());
    assert_eq!(saved.audit_log[0].actor, reviewer());
}

#[tokio::test]
async fn test_transmit_level_two() {
    let claim = TestClaimBuilder::new()
        .with_status(ClaimStatus::DraftedL2)
        .with_outcome(AdjudicationOutcome::Denied)
        .with_draft("Level 2 appeal")
        .build();
    let h = harness(vec![claim.clone()]).await;

    let sent = h
        .service
        .mark_transmitted(claim.id, TransmissionRef::new("FAX-9001"), reviewer())
        .await
        .unwrap();
    assert_status(&sent, ClaimStatus::SubmittedL2);
    assert_eq!(sent.outcome, AdjudicationOutcome::Pending);
    assert_eq!(sent.submission.delivery, DeliveryStatus::Pending);
    assert_eq!(sent.current_tier(), AppealTier::Level2);
}

#[tokio::test]
async fn test_transmit_requires_draft() {
    let claim = TestClaimBuilder::new()
        .with_status(ClaimStatus::Drafted)
        .without_draft()
        .build();
    let h = harness(vec![claim.clone()]).await;

    let err = h
        .service
        .mark_transmitted(claim.id, TransmissionRef::new("FAX-1"), reviewer())
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::Claim(ClaimError::InvalidClaimState(_))));
}

#[tokio::test]
async fn test_illegal_edge_is_rejected() {
    let claim = TestClaimBuilder::new().build();
    let h = harness(vec![claim.clone()]).await;

    let err = h
        .service
        .mark_transmitted(claim.id, TransmissionRef::new("FAX-1"), reviewer())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReviewError::Claim(ClaimError::InvalidStatusTransition { .. })
    ));
    assert_status(&h.claims.get_claim(claim.id).await.unwrap(), ClaimStatus::New);
}

#[tokio::test]
async fn test_resolve_route_heals_and_redrafts() {
    let claim = TestClaimBuilder::submitted()
        .with_status(ClaimStatus::HealingRequired)
        .with_transmission("FAX-1", DeliveryStatus::Failed)
        .build();
    let h = harness(vec![claim.clone()]).await;

    let healed = h
        .service
        .resolve_route(claim.id, "1-860-555-0199".into(), None, Actor::Reconciler)
        .await
        .unwrap();
    assert_status(&healed, ClaimStatus::Drafted);

    let route = h.routes.resolve(PayerFixtures::aetna()).await.unwrap();
    assert_eq!(route.fax, "1-860-555-0199");
    assert_eq!(route.provenance, RouteProvenance::Healed);
    assert_eq!(route.department, "Appeals Department");
}

#[tokio::test]
async fn test_paper_rejection_round_trip() {
    let claim = TestClaimBuilder::submitted().build();
    let h = harness(vec![claim.clone()]).await;

    let ocr = h
        .service
        .record_inbound_fax(claim.id, "IN-42".into(), reviewer())
        .await
        .unwrap();
    assert_status(&ocr, ClaimStatus::OcrRequired);
    let events = h.events.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::OcrRequired);

    let refined = h
        .service
        .record_ocr_extraction(
            claim.id,
            ReasonCode::new("co-197"),
            "Prior authorization not on file".into(),
            reviewer(),
        )
        .await
        .unwrap();
    assert_status(&refined, ClaimStatus::RefinementRequired);
    assert_eq!(refined.reason_code, ReasonCode::new("CO-197"));

    let redrafted = h
        .service
        .complete_refinement(claim.id, "narrative/42".into(), reviewer())
        .await
        .unwrap();
    assert_status(&redrafted, ClaimStatus::Drafted);
    assert!(redrafted.draft.is_none());
    assert_eq!(redrafted.narrative_ref.as_deref(), Some("narrative/42"));
    assert_transition_count(&redrafted, 3);
    assert_audit_chain(&redrafted);
}

#[tokio::test]
async fn test_discovery_then_cms() {
    let claim = TestClaimBuilder::submitted()
        .with_status(ClaimStatus::EscalatedL1)
        .build();
    let h = harness(vec![claim.clone()]).await;

    let discovery = h.service.open_discovery(claim.id, reviewer()).await.unwrap();
    assert_status(&discovery, ClaimStatus::DiscoveryPhase);
    assert!(discovery.latest_notice(NoticeKind::DiscoveryDemand).is_some());

    let cms = h.service.escalate_to_cms(claim.id, reviewer()).await.unwrap();
    assert_status(&cms, ClaimStatus::CmsEscalated);
    assert!(cms.latest_notice(NoticeKind::CmsComplaint).is_some());

    let err = h.service.open_discovery(claim.id, reviewer()).await.unwrap_err();
    assert!(matches!(err, ReviewError::Claim(ClaimError::ClaimClosed(_))));
}

#[tokio::test]
async fn test_learn_from_edit_upserts_custom_rule() {
    let claim = TestClaimBuilder::new()
        .with_payer(PayerFixtures::cigna())
        .with_reason_code(PayerFixtures::co_197())
        .build();
    let h = harness(vec![claim.clone()]).await;

    let rule = h
        .service
        .learn_from_edit(claim.id, "Patient failed two prior agents".into(), reviewer())
        .await
        .unwrap();
    assert_eq!(rule.provenance, RuleProvenance::PhysicianEdit);
    assert!(matches!(rule.strategy, AppealStrategy::Custom(_)));

    let resolved = h
        .rules
        .lookup(PayerFixtures::cigna(), &PayerFixtures::co_197())
        .await
        .unwrap();
    assert_eq!(resolved, rule.strategy);

    let stored = h.claims.get_claim(claim.id).await.unwrap();
    assert_eq!(stored.audit_log.len(), 1);
}

#[tokio::test]
async fn test_follow_ups_list_stale_submissions() {
    let stale = TestClaimBuilder::submitted()
        .submitted_at(TemporalFixtures::detected_at() - Duration::days(5))
        .build();
    let fresh = TestClaimBuilder::submitted().build();
    let h = harness(vec![stale.clone(), fresh]).await;

    let follow_ups = h.service.follow_ups(None).await.unwrap();
    assert_eq!(follow_ups.len(), 1);
    assert_eq!(follow_ups[0].claim_id, stale.id);
}

#[tokio::test]
async fn test_omnibus_patterns() {
    let claims: Vec<Claim> = (0..3)
        .map(|_| TestClaimBuilder::new().with_procedure("Knee MRI").build())
        .collect();
    let h = harness(claims).await;

    let groups = h.service.omnibus_patterns(3).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].claim_ids.len(), 3);
}

#[tokio::test]
async fn test_level_two_refinement_returns_to_level_two_draft() {
    let claim = TestClaimBuilder::submitted()
        .with_status(ClaimStatus::SubmittedL2)
        .build();
    let h = harness(vec![claim.clone()]).await;

    h.service
        .record_inbound_fax(claim.id, "IN-77".into(), reviewer())
        .await
        .unwrap();
    h.service
        .record_ocr_extraction(
            claim.id,
            ReasonCode::new("CO-50"),
            "Not medically necessary".into(),
            reviewer(),
        )
        .await
        .unwrap();
    let redrafted = h
        .service
        .complete_refinement(claim.id, "narrative/77".into(), reviewer())
        .await
        .unwrap();

    assert_status(&redrafted, ClaimStatus::DraftedL2);
    assert_eq!(redrafted.tier, AppealTier::Level2);
    let stored = h.claims.get_claim(claim.id).await.unwrap();
    assert_status(&stored, ClaimStatus::DraftedL2);
    assert_eq!(stored.version, redrafted.version);
}
