//! Human review actions
//!
//! Single-claim operations performed by reviewers outside the batch: editing
//! drafts, recording transmissions, repairing routes, handling paper
//! rejections and escalating to discovery or CMS. Each action validates the
//! lifecycle edge, appends to the audit log and persists the claim.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};

use core_kernel::{ClaimId, Clock};
use domain_claims::followup::default_follow_up_after;
use domain_claims::letters;
use domain_claims::{
    detect_patterns, learn_from_edit, stale_submissions, Actor, AdjudicationOutcome, AppealDraft,
    AppealTier, Claim, ClaimError, ClaimEvent, ClaimStatus, ClaimStore, ComplaintGenerator,
    EventSink, FollowUp, NoticeKind, OmnibusGroup, PayerRoute, PayerRouteStore, ReasonCode,
    RouteProvenance, StrategyRule, StrategyRulesStore, TransmissionRef,
};

use crate::error::ReviewError;

/// Minimum group size for an omnibus notice
pub const DEFAULT_OMNIBUS_MIN_CLAIMS: usize = 3;

#[derive(Clone)]
pub struct ReviewService {
    claims: Arc<dyn ClaimStore>,
    rules: Arc<dyn StrategyRulesStore>,
    routes: Arc<dyn PayerRouteStore>,
    complaints: Arc<dyn ComplaintGenerator>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
}

impl ReviewService {
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        rules: Arc<dyn StrategyRulesStore>,
        routes: Arc<dyn PayerRouteStore>,
        complaints: Arc<dyn ComplaintGenerator>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            claims,
            rules,
            routes,
            complaints,
            events,
            clock,
        }
    }

    /// Stores a newly detected denial
    #[instrument(skip(self, claim), fields(claim_id = %claim.id, payer = %claim.payer))]
    pub async fn register_claim(&self, claim: Claim) -> Result<Claim, ReviewError> {
        if claim.status != ClaimStatus::New {
            return Err(ClaimError::invalid_state("new claims must start in NEW").into());
        }
        self.claims.insert_claim(&claim).await?;
        info!("Denial registered");
        Ok(claim)
    }

    pub async fn get_claim(&self, id: ClaimId) -> Result<Claim, ReviewError> {
        self.load(id).await
    }

    /// Replaces the appeal text with a reviewer's edit
    ///
    /// The claim stays in `Drafted`/`DraftedL2`, or moves there from a status
    /// with a drafting edge.
    #[instrument(skip(self, text))]
    pub async fn save_draft(
        &self,
        id: ClaimId,
        text: String,
        actor: Actor,
    ) -> Result<Claim, ReviewError> {
        let now = self.clock.now();
        let mut claim = self.load(id).await?;

        let target = match claim.status {
            ClaimStatus::Drafted | ClaimStatus::DraftedL2 => None,
            _ => Some(claim.drafted_status()),
        };
        if let Some(to) = target {
            claim.ensure_edge(to)?;
        }

        let strategy = claim
            .draft
            .as_ref()
            .map(|d| d.strategy.clone())
            .or_else(|| claim.strategy.clone())
            .unwrap_or_default();
        let tier = claim.current_tier();
        if tier == AppealTier::Level1 {
            claim.ensure_due_at()?;
        }
        claim.set_draft(AppealDraft {
            text,
            strategy,
            tier,
            human_edited: true,
            updated_at: now,
        });

        match target {
            Some(to) => claim.transition(to, "appeal draft saved by reviewer", actor, now)?,
            None => claim.note("appeal draft edited by reviewer", actor, now),
        }
        self.persist(&mut claim).await?;
        Ok(claim)
    }

    /// Records that the drafted appeal was transmitted
    #[instrument(skip(self))]
    pub async fn mark_transmitted(
        &self,
        id: ClaimId,
        transmission_ref: TransmissionRef,
        actor: Actor,
    ) -> Result<Claim, ReviewError> {
        let now = self.clock.now();
        let mut claim = self.load(id).await?;

        let to = claim.submitted_status();
        claim.ensure_edge(to)?;
        if claim.draft.is_none() && claim.status != ClaimStatus::OcrRequired {
            return Err(ClaimError::invalid_state("cannot transmit a claim without a draft").into());
        }

        claim.record_transmission(transmission_ref.clone(), now);
        claim.outcome = AdjudicationOutcome::Pending;
        claim.transition(to, format!("appeal transmitted as {transmission_ref}"), actor, now)?;
        self.persist(&mut claim).await?;
        Ok(claim)
    }

    /// Completes self-healing: stores the repaired route and returns the
    /// claim to `Drafted` (or `DraftedL2`) for retransmission
    #[instrument(skip(self))]
    pub async fn resolve_route(
        &self,
        id: ClaimId,
        fax: String,
        department: Option<String>,
        actor: Actor,
    ) -> Result<Claim, ReviewError> {
        let now = self.clock.now();
        let mut claim = self.load(id).await?;
        if claim.status != ClaimStatus::HealingRequired {
            return Err(ClaimError::invalid_state(format!(
                "route can only be resolved while HEALING_REQUIRED, claim is {}",
                claim.status
            ))
            .into());
        }
        let to = claim.drafted_status();
        claim.ensure_edge(to)?;

        let current = self.routes.resolve(&claim.payer).await?;
        let mut healed = PayerRoute::new(
            current.payer.clone(),
            fax.clone(),
            department.unwrap_or(current.department),
            RouteProvenance::Healed,
            now,
        );
        healed.aliases = current.aliases;
        self.routes.upsert_route(healed).await?;

        claim.transition(to, format!("route healed to {fax}"), actor, now)?;
        self.persist(&mut claim).await?;
        Ok(claim)
    }

    /// A paper rejection arrived by fax
    #[instrument(skip(self))]
    pub async fn record_inbound_fax(
        &self,
        id: ClaimId,
        fax_id: String,
        actor: Actor,
    ) -> Result<Claim, ReviewError> {
        let now = self.clock.now();
        let mut claim = self.load(id).await?;
        claim.ensure_edge(ClaimStatus::OcrRequired)?;

        claim.submission.inbound_fax_id = Some(fax_id.clone());
        claim.transition(
            ClaimStatus::OcrRequired,
            format!("paper rejection received on fax {fax_id}"),
            actor,
            now,
        )?;
        self.persist(&mut claim).await?;
        self.emit(ClaimEvent::ocr_required(&claim, &fax_id, now)).await;
        Ok(claim)
    }

    /// Stores the denial details extracted from a paper rejection
    #[instrument(skip(self, denial_text))]
    pub async fn record_ocr_extraction(
        &self,
        id: ClaimId,
        reason_code: ReasonCode,
        denial_text: String,
        actor: Actor,
    ) -> Result<Claim, ReviewError> {
        let now = self.clock.now();
        let mut claim = self.load(id).await?;
        claim.ensure_edge(ClaimStatus::RefinementRequired)?;

        if !reason_code.is_unknown() {
            claim.reason_code = reason_code;
        }
        claim.denial_text = Some(denial_text);
        claim.transition(
            ClaimStatus::RefinementRequired,
            format!("denial extracted with reason {}", claim.reason_code),
            actor,
            now,
        )?;
        self.persist(&mut claim).await?;
        Ok(claim)
    }

    /// Attaches the refined clinical narrative; the draft is cleared so the
    /// next batch regenerates it
    #[instrument(skip(self))]
    pub async fn complete_refinement(
        &self,
        id: ClaimId,
        narrative_ref: String,
        actor: Actor,
    ) -> Result<Claim, ReviewError> {
        let now = self.clock.now();
        let mut claim = self.load(id).await?;
        if claim.status != ClaimStatus::RefinementRequired {
            return Err(ClaimError::invalid_state(format!(
                "refinement can only complete from REFINEMENT_REQUIRED, claim is {}",
                claim.status
            ))
            .into());
        }

        claim.narrative_ref = Some(narrative_ref);
        claim.draft = None;
        let to = claim.drafted_status();
        claim.transition(to, "clinical narrative refined", actor, now)?;
        self.persist(&mut claim).await?;
        Ok(claim)
    }

    /// Issues a formal information demand
    #[instrument(skip(self))]
    pub async fn open_discovery(&self, id: ClaimId, actor: Actor) -> Result<Claim, ReviewError> {
        let now = self.clock.now();
        let mut claim = self.load(id).await?;
        claim.ensure_edge(ClaimStatus::DiscoveryPhase)?;

        let demand = letters::discovery_demand(&claim, now);
        claim.add_notice(NoticeKind::DiscoveryDemand, demand, now);
        claim.transition(ClaimStatus::DiscoveryPhase, "discovery demand issued", actor, now)?;
        self.persist(&mut claim).await?;
        Ok(claim)
    }

    /// Files a complaint with CMS; terminal
    #[instrument(skip(self))]
    pub async fn escalate_to_cms(&self, id: ClaimId, actor: Actor) -> Result<Claim, ReviewError> {
        let now = self.clock.now();
        let mut claim = self.load(id).await?;
        claim.ensure_edge(ClaimStatus::CmsEscalated)?;

        let complaint = self.complaints.cms_complaint(&claim, now).await?;
        claim.add_notice(NoticeKind::CmsComplaint, complaint, now);
        claim.transition(ClaimStatus::CmsEscalated, "complaint filed with CMS", actor, now)?;
        self.persist(&mut claim).await?;
        Ok(claim)
    }

    /// Turns a physician's edit into a custom strategy rule
    #[instrument(skip(self, edited_text))]
    pub async fn learn_from_edit(
        &self,
        id: ClaimId,
        edited_text: String,
        actor: Actor,
    ) -> Result<StrategyRule, ReviewError> {
        let now = self.clock.now();
        let mut claim = self.load(id).await?;
        if claim.status.is_terminal() {
            return Err(ClaimError::ClaimClosed(claim.status.to_string()).into());
        }

        let rule = learn_from_edit(&claim, &edited_text, now);
        self.rules.upsert(rule.clone()).await?;
        claim.note(
            format!("physician edit learned for {} / {}", rule.payer, rule.reason_code),
            actor,
            now,
        );
        self.persist(&mut claim).await?;
        info!(payer = %rule.payer, reason = %rule.reason_code, "Strategy learned from edit");
        Ok(rule)
    }

    /// Systemic denial patterns across all unsettled claims
    pub async fn omnibus_patterns(&self, min_claims: usize) -> Result<Vec<OmnibusGroup>, ReviewError> {
        let claims = self.claims.list_claims().await?;
        Ok(detect_patterns(&claims, min_claims, self.clock.now())?)
    }

    /// Submitted claims waiting longer than `after` (3 days by default)
    pub async fn follow_ups(&self, after: Option<Duration>) -> Result<Vec<FollowUp>, ReviewError> {
        let claims = self.claims.load_open_claims().await?;
        let now: DateTime<Utc> = self.clock.now();
        Ok(stale_submissions(
            &claims,
            now,
            after.unwrap_or_else(default_follow_up_after),
        ))
    }

    /// Saves under the version the claim was loaded at
    async fn persist(&self, claim: &mut Claim) -> Result<(), ReviewError> {
        self.claims.save_claim(claim).await?;
        claim.version += 1;
        Ok(())
    }

    async fn load(&self, id: ClaimId) -> Result<Claim, ReviewError> {
        match self.claims.get_claim(id).await {
            Ok(claim) => Ok(claim),
            Err(err) if err.is_not_found() => Err(ReviewError::ClaimNotFound(id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn emit(&self, event: ClaimEvent) {
        let kind = event.kind;
        if let Err(err) = self.events.emit(event).await {
            warn!(event = kind.as_str(), error = %err, "Failed to emit claim event");
        }
    }
}
