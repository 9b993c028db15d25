//! Lifecycle Orchestrator
//!
//! Loads every open claim and drives each one through the transition rules:
//!
//! 1. transmission check for submitted appeals with an unconfirmed delivery
//! 2. adjudication poll and escalation evaluation
//! 3. drafting when a new appeal is needed
//!
//! The rules are applied repeatedly to the in-memory claim until none fires,
//! reusing a single adjudication read, and the claim is then persisted once.
//! The save is conditional on the version the claim was loaded at, so a
//! review action that lands mid-batch wins and the claim is retried on the
//! next run.
//! A second run against unchanged external data therefore finds nothing to
//! do. Claims run with bounded parallelism and per-claim failures never stop
//! the batch.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use core_kernel::{ClaimId, Clock, PortError};
use domain_claims::{
    evaluate, learn_from_victory, Actor, AdjudicationOutcome, AdjudicationReport, AppealDraft,
    AppealTier, AuditFlag, Claim, ClaimEvent, ClaimStatus, ClaimStore, ComplaintGenerator,
    DraftGenerator, EventSink, NoticeKind, PayerRouteStore, Priority, StrategyRulesStore, Verdict,
};

use crate::config::ReconcilerConfig;
use crate::error::ReconcileError;
use crate::monitor::{DeliveryCheck, TransmissionMonitor};
use crate::poller::{AdjudicationPoller, PollOutcome};
use crate::report::{FailureRecord, ReconcileReport, TransitionRecord};

/// Stores and collaborators the orchestrator writes through
#[derive(Clone)]
pub struct ReconcilerPorts {
    pub claims: Arc<dyn ClaimStore>,
    pub rules: Arc<dyn StrategyRulesStore>,
    pub routes: Arc<dyn PayerRouteStore>,
    pub drafts: Arc<dyn DraftGenerator>,
    pub complaints: Arc<dyn ComplaintGenerator>,
    pub events: Arc<dyn EventSink>,
}

/// The reconciliation engine
pub struct Reconciler {
    ports: ReconcilerPorts,
    poller: AdjudicationPoller,
    monitor: TransmissionMonitor,
    clock: Arc<dyn Clock>,
    config: ReconcilerConfig,
}

enum ClaimRun {
    Deferred(ClaimId),
    Done {
        transitions: Vec<TransitionRecord>,
        failure: Option<FailureRecord>,
    },
}

enum Step {
    Fired,
    Quiet,
}

/// Per-claim scratch state for one batch
#[derive(Default)]
struct Cycle {
    delivery_checked: bool,
    skip_adjudication: bool,
    poll: Option<PollOutcome>,
    unreachable: Option<Vec<String>>,
    dirty: bool,
    victory: bool,
    transitions: Vec<TransitionRecord>,
    /// Must reach the sink before the claim is saved
    required_events: Vec<ClaimEvent>,
    events: Vec<ClaimEvent>,
}

impl Reconciler {
    pub fn new(
        ports: ReconcilerPorts,
        poller: AdjudicationPoller,
        monitor: TransmissionMonitor,
        clock: Arc<dyn Clock>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            ports,
            poller,
            monitor,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Runs one reconciliation batch over every open claim
    ///
    /// # Returns
    ///
    /// The batch report. Only a failure to load the open claims is an error;
    /// everything after that is reported per claim.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<ReconcileReport, ReconcileError> {
        let now = self.clock.now();
        let started = Instant::now();
        let deadline = started.checked_add(self.config.batch_deadline());
        if deadline.is_none() {
            warn!("Batch deadline out of range, running without one");
        }

        let claims = self
            .bounded("claim_store.load_open_claims", self.ports.claims.load_open_claims())
            .await
            .map_err(ReconcileError::Persistence)?;
        info!(claims = claims.len(), as_of = %now, "Reconciliation batch started");

        let runs: Vec<ClaimRun> = stream::iter(claims)
            .map(|claim| self.run_claim(claim, now, deadline))
            .buffer_unordered(self.config.effective_concurrency())
            .collect()
            .await;

        let mut report = ReconcileReport {
            as_of: Some(now),
            ..Default::default()
        };
        for run in runs {
            match run {
                ClaimRun::Deferred(id) => report.deferred.push(id),
                ClaimRun::Done {
                    transitions,
                    failure,
                } => {
                    report.processed += 1;
                    report.transitions.extend(transitions);
                    report.failures.extend(failure);
                }
            }
        }
        report.deferred.sort();
        report.failures.sort_by_key(|f| f.claim_id);
        report.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            processed = report.processed,
            transitions = report.transitions.len(),
            failures = report.failures.len(),
            deferred = report.deferred.len(),
            elapsed_ms = report.elapsed_ms,
            "Reconciliation batch finished"
        );
        Ok(report)
    }

    async fn run_claim(
        &self,
        claim: Claim,
        now: DateTime<Utc>,
        deadline: Option<Instant>,
    ) -> ClaimRun {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            debug!(claim_id = %claim.id, "Batch deadline passed, deferring claim");
            return ClaimRun::Deferred(claim.id);
        }

        let claim_id = claim.id;
        match self.reconcile_claim(claim, now).await {
            Ok((transitions, failure)) => ClaimRun::Done {
                transitions,
                failure,
            },
            Err(err) => {
                warn!(claim_id = %claim_id, error = %err, "Claim reconciliation failed");
                ClaimRun::Done {
                    transitions: Vec::new(),
                    failure: Some(FailureRecord::new(claim_id, &err)),
                }
            }
        }
    }

    /// Drives one claim to a fixed point and persists it
    #[instrument(skip(self, claim, now), fields(claim_id = %claim.id, status = %claim.status))]
    async fn reconcile_claim(
        &self,
        mut claim: Claim,
        now: DateTime<Utc>,
    ) -> Result<(Vec<TransitionRecord>, Option<FailureRecord>), ReconcileError> {
        let mut cycle = Cycle::default();
        let max_steps = self.config.effective_max_steps();

        let mut steps = 0;
        loop {
            if steps >= max_steps {
                warn!(max_steps, "Step limit reached before a fixed point");
                break;
            }
            steps += 1;
            match self.step(&mut claim, now, &mut cycle).await? {
                Step::Fired => continue,
                Step::Quiet => break,
            }
        }

        // a lost heal event would strand the claim in HEALING_REQUIRED, so
        // the claim is only saved once the sink has it
        for event in cycle.required_events.drain(..) {
            self.bounded("event_sink.emit", self.ports.events.emit(event))
                .await
                .map_err(|e| ReconcileError::collaborator("event_sink", e))?;
        }

        if cycle.dirty {
            self.bounded("claim_store.save_claim", self.ports.claims.save_claim(&claim))
                .await
                .map_err(|e| match e {
                    PortError::Conflict { .. } => ReconcileError::ConcurrentUpdate(e),
                    other => ReconcileError::Persistence(other),
                })?;
        }

        for event in cycle.events.drain(..) {
            let kind = event.kind;
            if let Err(err) = self.bounded("event_sink.emit", self.ports.events.emit(event)).await {
                warn!(event = kind.as_str(), error = %err, "Failed to emit claim event");
            }
        }

        if cycle.victory {
            if let Some(rule) = learn_from_victory(&claim, now) {
                debug!(payer = %rule.payer, reason = %rule.reason_code, strategy = %rule.strategy, "Recording winning strategy");
                if let Err(err) = self.bounded("strategy_rules.upsert", self.ports.rules.upsert(rule)).await {
                    warn!(error = %err, "Failed to record winning strategy");
                }
            }
        }

        let failure = cycle.unreachable.take().map(|attempted| {
            FailureRecord::new(claim.id, &ReconcileError::SourceUnavailable { attempted })
        });
        Ok((cycle.transitions, failure))
    }

    async fn step(
        &self,
        claim: &mut Claim,
        now: DateTime<Utc>,
        cycle: &mut Cycle,
    ) -> Result<Step, ReconcileError> {
        // Rule 1: transmission check
        if !cycle.delivery_checked && claim.awaiting_delivery() {
            cycle.delivery_checked = true;
            if let Some(transmission) = claim.submission.transmission_ref.clone() {
                match self.monitor.check_delivery(&transmission).await {
                    DeliveryCheck::Failed => {
                        let route = self
                            .bounded("payer_routes.resolve", self.ports.routes.resolve(&claim.payer))
                            .await
                            .map_err(|e| ReconcileError::collaborator("payer_routes", e))?;
                        claim.mark_delivery_failed(now);
                        self.apply(
                            claim,
                            ClaimStatus::HealingRequired,
                            format!("transmission {transmission} failed"),
                            Vec::new(),
                            now,
                            cycle,
                        )?;
                        cycle.required_events.push(ClaimEvent::heal(claim, &route, now));
                        cycle.skip_adjudication = true;
                        return Ok(Step::Fired);
                    }
                    DeliveryCheck::Delivered => {
                        claim.confirm_delivery(now);
                        cycle.dirty = true;
                        return Ok(Step::Fired);
                    }
                    DeliveryCheck::Pending | DeliveryCheck::Unavailable => {}
                }
            }
        }

        // Rule 2: adjudication
        if claim.status.polls_adjudication() && !cycle.skip_adjudication {
            let outcome = match &cycle.poll {
                Some(outcome) => outcome.clone(),
                None => {
                    let outcome = self.poller.poll(&claim.payer, &claim.payer_reference()).await;
                    cycle.poll = Some(outcome.clone());
                    outcome
                }
            };
            match outcome {
                PollOutcome::Unreachable { attempted } => {
                    cycle.unreachable = Some(attempted);
                    return Ok(Step::Quiet);
                }
                PollOutcome::Reported(report) => {
                    if let Verdict::Advance { to, reason } =
                        evaluate(claim.status, claim.due_at, report.outcome, now)?
                    {
                        self.advance(claim, to, reason, &report, now, cycle).await?;
                        return Ok(Step::Fired);
                    }
                }
            }
        }

        // Rule 3: drafting
        if self.needs_draft(claim) {
            self.draft(claim, now, cycle).await?;
            return Ok(Step::Fired);
        }

        Ok(Step::Quiet)
    }

    async fn advance(
        &self,
        claim: &mut Claim,
        to: ClaimStatus,
        reason: String,
        report: &AdjudicationReport,
        now: DateTime<Utc>,
        cycle: &mut Cycle,
    ) -> Result<(), ReconcileError> {
        let mut flags = Vec::new();
        if report.source.is_synthetic() {
            flags.push(AuditFlag::SyntheticSource);
        }

        match to {
            ClaimStatus::Settled => {
                let from = claim.status;
                let recovered =
                    claim.settle(report.settled_amount, reason.clone(), Actor::Reconciler, flags, now)?;
                info!(from = %from, recovered = %recovered, source = %report.source, "Claim settled");
                cycle.record(claim.id, from, to, reason);
                cycle.events.push(ClaimEvent::victory(claim, &recovered, now));
                cycle.victory = true;
            }
            ClaimStatus::EscalatedL1 => {
                self.apply(claim, to, reason, flags, now, cycle)?;
                let notice = self
                    .bounded(
                        "complaint_generator.violation_notice",
                        self.ports.complaints.violation_notice(claim, now),
                    )
                    .await
                    .map_err(|e| ReconcileError::collaborator("complaint_generator", e))?;
                claim.add_notice(NoticeKind::ViolationNotice, notice, now);
            }
            ClaimStatus::Level2Pending => {
                claim.outcome = AdjudicationOutcome::Denied;
                self.apply(claim, to, reason, flags, now, cycle)?;
            }
            _ => self.apply(claim, to, reason, flags, now, cycle)?,
        }
        Ok(())
    }

    fn needs_draft(&self, claim: &Claim) -> bool {
        match claim.status {
            ClaimStatus::Level2Pending => true,
            ClaimStatus::New | ClaimStatus::Drafted => {
                claim.draft.is_none() && self.qualifies_for_auto_draft(claim.priority)
            }
            ClaimStatus::DraftedL2 => claim.draft.is_none(),
            _ => false,
        }
    }

    fn qualifies_for_auto_draft(&self, priority: Priority) -> bool {
        match priority {
            Priority::Urgent => true,
            Priority::Standard => self.config.auto_draft_standard,
        }
    }

    async fn draft(
        &self,
        claim: &mut Claim,
        now: DateTime<Utc>,
        cycle: &mut Cycle,
    ) -> Result<(), ReconcileError> {
        let strategy = self
            .bounded(
                "strategy_rules.lookup",
                self.ports.rules.lookup(&claim.payer, &claim.reason_code),
            )
            .await
            .map_err(ReconcileError::Persistence)?;

        let tier = claim.current_tier();
        if tier == AppealTier::Level1 {
            claim.ensure_due_at()?;
        }

        let text = self
            .bounded(
                "draft_generator.generate_appeal",
                self.ports.drafts.generate_appeal(claim, &strategy, tier),
            )
            .await
            .map_err(|e| ReconcileError::collaborator("draft_generator", e))?;

        claim.strategy = Some(strategy.clone());
        claim.set_draft(AppealDraft {
            text,
            strategy: strategy.clone(),
            tier,
            human_edited: false,
            updated_at: now,
        });
        cycle.dirty = true;

        match claim.status {
            ClaimStatus::New => self.apply(
                claim,
                ClaimStatus::Drafted,
                format!("level 1 appeal drafted using {strategy}"),
                Vec::new(),
                now,
                cycle,
            ),
            ClaimStatus::Level2Pending => self.apply(
                claim,
                ClaimStatus::DraftedL2,
                format!("level 2 appeal drafted using {strategy}"),
                Vec::new(),
                now,
                cycle,
            ),
            _ => {
                debug!(strategy = %strategy, "Missing draft regenerated");
                Ok(())
            }
        }
    }

    fn apply(
        &self,
        claim: &mut Claim,
        to: ClaimStatus,
        reason: String,
        flags: Vec<AuditFlag>,
        now: DateTime<Utc>,
        cycle: &mut Cycle,
    ) -> Result<(), ReconcileError> {
        let from = claim.status;
        claim.transition_with_flags(to, reason.clone(), Actor::Reconciler, flags, now)?;
        info!(from = %from, to = %to, reason = %reason, "Claim transitioned");
        cycle.record(claim.id, from, to, reason);
        Ok(())
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, PortError>
    where
        F: Future<Output = Result<T, PortError>>,
    {
        let limit = self.config.collaborator_timeout();
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(PortError::timeout(operation, limit)),
        }
    }
}

impl Cycle {
    fn record(&mut self, claim_id: ClaimId, from: ClaimStatus, to: ClaimStatus, reason: String) {
        self.dirty = true;
        self.transitions.push(TransitionRecord {
            claim_id,
            from,
            to,
            reason,
        });
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("poller", &self.poller)
            .field("monitor", &self.monitor)
            .field("config", &self.config)
            .finish()
    }
}
