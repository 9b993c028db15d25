//! Test Data Builders
//!
//! Builder patterns for constructing claims and adjudication reports with
//! sensible defaults. Tests specify only the fields they care about.
//!
//! Claims are placed directly in the requested status without audit history,
//! the way a store would hand them to the reconciler.

use chrono::{DateTime, Duration, Utc};

use core_kernel::{ClaimId, Money};
use domain_claims::{
    AdjudicationOutcome, AdjudicationReport, AppealDraft, AppealStrategy, AppealTier, Claim,
    ClaimStatus, DeliveryStatus, Priority, ReasonCode, ReportSource, TransmissionRef,
};

use crate::fixtures::{MoneyFixtures, PayerFixtures, TemporalFixtures};

/// Builder for test claims
pub struct TestClaimBuilder {
    id: Option<ClaimId>,
    payer: String,
    procedure: String,
    reason_code: ReasonCode,
    stake: Money,
    priority: Priority,
    created_at: DateTime<Utc>,
    status: ClaimStatus,
    tier: AppealTier,
    outcome: AdjudicationOutcome,
    transmission_ref: Option<TransmissionRef>,
    delivery: DeliveryStatus,
    submitted_at: Option<DateTime<Utc>>,
    draft: Option<String>,
    strategy: Option<AppealStrategy>,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// Urgent Aetna CO-50 denial in `New`
    pub fn new() -> Self {
        Self {
            id: None,
            payer: PayerFixtures::aetna().to_string(),
            procedure: "Lumbar Spinal Fusion".to_string(),
            reason_code: PayerFixtures::co_50(),
            stake: MoneyFixtures::stake_18500(),
            priority: Priority::Urgent,
            created_at: TemporalFixtures::detected_at(),
            status: ClaimStatus::New,
            tier: AppealTier::Level1,
            outcome: AdjudicationOutcome::Pending,
            transmission_ref: None,
            delivery: DeliveryStatus::Pending,
            submitted_at: None,
            draft: None,
            strategy: None,
        }
    }

    /// A delivered level 1 appeal awaiting a decision
    pub fn submitted() -> Self {
        Self::new()
            .with_status(ClaimStatus::Submitted)
            .with_draft("Level 1 appeal")
            .with_transmission("FAX-1001", DeliveryStatus::Delivered)
    }

    pub fn with_id(mut self, id: ClaimId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_payer(mut self, payer: impl Into<String>) -> Self {
        self.payer = payer.into();
        self
    }

    pub fn with_procedure(mut self, procedure: impl Into<String>) -> Self {
        self.procedure = procedure.into();
        self
    }

    pub fn with_reason_code(mut self, code: ReasonCode) -> Self {
        self.reason_code = code;
        self
    }

    pub fn with_stake(mut self, stake: Money) -> Self {
        self.stake = stake;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.status = status;
        self
    }

    /// Appeal level for claims placed in a side status such as `HealingRequired`
    pub fn with_tier(mut self, tier: AppealTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_outcome(mut self, outcome: AdjudicationOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Sets the transmission reference and its delivery state
    pub fn with_transmission(mut self, reference: &str, delivery: DeliveryStatus) -> Self {
        self.transmission_ref = Some(TransmissionRef::new(reference));
        self.delivery = delivery;
        self
    }

    pub fn submitted_at(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_at = Some(at);
        self
    }

    pub fn with_draft(mut self, text: impl Into<String>) -> Self {
        self.draft = Some(text.into());
        self
    }

    pub fn without_draft(mut self) -> Self {
        self.draft = None;
        self
    }

    pub fn with_strategy(mut self, strategy: AppealStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn build(self) -> Claim {
        let mut claim = Claim::new(
            self.payer,
            self.procedure,
            self.reason_code,
            self.stake,
            self.priority,
            self.created_at,
        );
        if let Some(id) = self.id {
            claim.id = id;
        }
        claim.status = self.status;
        claim.tier = self.tier.max(claim.current_tier());
        claim.outcome = self.outcome;
        claim.strategy = self.strategy.clone();

        if self.status != ClaimStatus::New {
            claim.due_at = Some(self.created_at + self.priority.window());
        }
        if let Some(text) = self.draft {
            let tier = claim.current_tier();
            claim.draft = Some(AppealDraft {
                text,
                strategy: self.strategy.unwrap_or_default(),
                tier,
                human_edited: false,
                updated_at: self.created_at,
            });
        }
        if let Some(reference) = self.transmission_ref {
            claim.submission.transmission_ref = Some(reference);
            claim.submission.delivery = self.delivery;
            claim.submission.submitted_at =
                Some(self.submitted_at.unwrap_or(self.created_at + Duration::hours(1)));
        }
        claim
    }
}

/// Builder for adjudication reports
pub struct TestReportBuilder {
    report: AdjudicationReport,
}

impl TestReportBuilder {
    pub fn new(outcome: AdjudicationOutcome) -> Self {
        Self {
            report: AdjudicationReport::new(outcome, ReportSource::Vendor("availity".to_string())),
        }
    }

    pub fn approved() -> Self {
        Self::new(AdjudicationOutcome::Approved)
    }

    pub fn denied() -> Self {
        Self::new(AdjudicationOutcome::Denied)
    }

    pub fn pending() -> Self {
        Self::new(AdjudicationOutcome::Pending)
    }

    pub fn from_source(mut self, name: &str) -> Self {
        self.report.source = ReportSource::Vendor(name.to_string());
        self
    }

    pub fn with_reason(mut self, code: &str) -> Self {
        self.report.reason_code = ReasonCode::new(code);
        self
    }

    pub fn with_settled_amount(mut self, amount: Money) -> Self {
        self.report.settled_amount = Some(amount);
        self
    }

    pub fn build(self) -> AdjudicationReport {
        self.report
    }
}
