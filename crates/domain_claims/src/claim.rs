//! Claim aggregate
//!
//! A claim ("lead") is created when a denial is detected and then moves
//! through the appeal lifecycle. All mutation goes through methods on
//! [`Claim`] so that edge validation and the audit trail cannot be bypassed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{checked_deadline, AuditEntryId, ClaimId, Money};

use crate::adjudication::{AdjudicationOutcome, ReasonCode};
use crate::audit::{Actor, AuditEntry, AuditFlag};
use crate::error::ClaimError;
use crate::strategy::AppealStrategy;

/// Lifecycle status of an appeal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Denial detected, nothing drafted yet
    New,
    /// First-level appeal drafted
    Drafted,
    /// First-level appeal transmitted to the payer
    Submitted,
    /// Regulatory window elapsed without a decision
    EscalatedL1,
    /// First-level appeal denied, second level to be drafted
    Level2Pending,
    DraftedL2,
    SubmittedL2,
    /// Transmission failed, route must be repaired
    HealingRequired,
    /// Denial details extracted, narrative must be refined
    RefinementRequired,
    /// Paper rejection received, awaiting extraction
    OcrRequired,
    /// Formal information demand issued
    DiscoveryPhase,
    /// Complaint filed with CMS (terminal)
    CmsEscalated,
    /// Payer approved (terminal)
    Settled,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 13] = [
        ClaimStatus::New,
        ClaimStatus::Drafted,
        ClaimStatus::Submitted,
        ClaimStatus::EscalatedL1,
        ClaimStatus::Level2Pending,
        ClaimStatus::DraftedL2,
        ClaimStatus::SubmittedL2,
        ClaimStatus::HealingRequired,
        ClaimStatus::RefinementRequired,
        ClaimStatus::OcrRequired,
        ClaimStatus::DiscoveryPhase,
        ClaimStatus::CmsEscalated,
        ClaimStatus::Settled,
    ];

    /// Stable storage code
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::New => "NEW",
            ClaimStatus::Drafted => "DRAFTED",
            ClaimStatus::Submitted => "SUBMITTED",
            ClaimStatus::EscalatedL1 => "ESCALATED_L1",
            ClaimStatus::Level2Pending => "LEVEL2_PENDING",
            ClaimStatus::DraftedL2 => "DRAFTED_L2",
            ClaimStatus::SubmittedL2 => "SUBMITTED_L2",
            ClaimStatus::HealingRequired => "HEALING_REQUIRED",
            ClaimStatus::RefinementRequired => "REFINEMENT_REQUIRED",
            ClaimStatus::OcrRequired => "OCR_REQUIRED",
            ClaimStatus::DiscoveryPhase => "DISCOVERY_PHASE",
            ClaimStatus::CmsEscalated => "CMS_ESCALATED",
            ClaimStatus::Settled => "SETTLED",
        }
    }

    /// Returns true for statuses that never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Settled | ClaimStatus::CmsEscalated)
    }

    /// Statuses whose adjudication is polled each cycle
    pub fn polls_adjudication(&self) -> bool {
        matches!(
            self,
            ClaimStatus::Submitted
                | ClaimStatus::EscalatedL1
                | ClaimStatus::Level2Pending
                | ClaimStatus::SubmittedL2
        )
    }

    /// Statuses that only exist for a second-level appeal
    pub fn is_level_two(&self) -> bool {
        matches!(
            self,
            ClaimStatus::Level2Pending | ClaimStatus::DraftedL2 | ClaimStatus::SubmittedL2
        )
    }

    /// Statuses in which a transmitted appeal may still be in flight
    pub fn is_transmitted(&self) -> bool {
        matches!(self, ClaimStatus::Submitted | ClaimStatus::SubmittedL2)
    }

    /// Checks whether `target` is a legal next status
    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (*self, target),
            (New, Drafted)
                | (Drafted, Submitted)
                | (Submitted, Settled)
                | (Submitted, EscalatedL1)
                | (Submitted, Level2Pending)
                | (Submitted, HealingRequired)
                | (Submitted, RefinementRequired)
                | (Submitted, OcrRequired)
                | (Submitted, DiscoveryPhase)
                | (Submitted, CmsEscalated)
                | (EscalatedL1, Settled)
                | (EscalatedL1, Level2Pending)
                | (EscalatedL1, CmsEscalated)
                | (EscalatedL1, DiscoveryPhase)
                | (Level2Pending, DraftedL2)
                | (Level2Pending, Settled)
                | (DraftedL2, SubmittedL2)
                | (SubmittedL2, Settled)
                | (SubmittedL2, HealingRequired)
                | (SubmittedL2, OcrRequired)
                | (SubmittedL2, CmsEscalated)
                | (SubmittedL2, DiscoveryPhase)
                | (HealingRequired, Drafted)
                | (HealingRequired, DraftedL2)
                | (OcrRequired, RefinementRequired)
                | (OcrRequired, Drafted)
                | (OcrRequired, DraftedL2)
                | (OcrRequired, Submitted)
                | (OcrRequired, SubmittedL2)
                | (RefinementRequired, Drafted)
                | (RefinementRequired, DraftedL2)
                | (DiscoveryPhase, CmsEscalated)
                | (DiscoveryPhase, Settled)
        )
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClaimError::UnknownStatus(s.to_string()))
    }
}

/// Regulatory urgency of the underlying request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// "High Priority": the payer must decide within 72 hours
    Urgent,
    /// Seven calendar days
    Standard,
}

impl Priority {
    /// Decision window granted to the payer
    pub fn window(&self) -> Duration {
        match self {
            Priority::Urgent => Duration::hours(72),
            Priority::Standard => Duration::hours(7 * 24),
        }
    }

    /// Storage code
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::Standard => "standard",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Urgent => "High Priority",
            Priority::Standard => "Standard",
        }
    }

    /// Human readable window used in letters
    pub fn window_label(&self) -> &'static str {
        match self {
            Priority::Urgent => "72 hours",
            Priority::Standard => "7 calendar days",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high priority" | "high" | "urgent" => Ok(Priority::Urgent),
            "standard" | "normal" | "routine" => Ok(Priority::Standard),
            _ => Err(ClaimError::UnknownPriority(s.to_string())),
        }
    }
}

/// Appeal level
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AppealTier {
    #[default]
    Level1,
    Level2,
}

impl AppealTier {
    pub fn number(&self) -> u8 {
        match self {
            AppealTier::Level1 => 1,
            AppealTier::Level2 => 2,
        }
    }

    pub fn from_number(n: i16) -> Self {
        if n >= 2 {
            AppealTier::Level2
        } else {
            AppealTier::Level1
        }
    }
}

/// Identifier assigned by the fax transmission service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransmissionRef(String);

impl TransmissionRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransmissionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivery state of a transmitted appeal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Not yet confirmed by the transmission service
    Pending,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delivered" | "success" => Ok(DeliveryStatus::Delivered),
            "failed" | "failure" => Ok(DeliveryStatus::Failed),
            "pending" | "queued" | "inprogress" | "in_progress" => Ok(DeliveryStatus::Pending),
            other => Err(ClaimError::invalid_state(format!(
                "unknown delivery status {other}"
            ))),
        }
    }
}

/// Submission metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub transmission_ref: Option<TransmissionRef>,
    pub delivery: DeliveryStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    /// Inbound fax that carried a paper rejection
    pub inbound_fax_id: Option<String>,
}

impl Default for Submission {
    fn default() -> Self {
        Self {
            transmission_ref: None,
            delivery: DeliveryStatus::Pending,
            submitted_at: None,
            inbound_fax_id: None,
        }
    }
}

/// Current appeal draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppealDraft {
    pub text: String,
    pub strategy: AppealStrategy,
    pub tier: AppealTier,
    pub human_edited: bool,
    pub updated_at: DateTime<Utc>,
}

/// Kinds of regulatory correspondence attached to a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    ViolationNotice,
    CmsComplaint,
    DiscoveryDemand,
    StatusInquiry,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::ViolationNotice => "violation_notice",
            NoticeKind::CmsComplaint => "cms_complaint",
            NoticeKind::DiscoveryDemand => "discovery_demand",
            NoticeKind::StatusInquiry => "status_inquiry",
        }
    }
}

impl FromStr for NoticeKind {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "violation_notice" => Ok(NoticeKind::ViolationNotice),
            "cms_complaint" => Ok(NoticeKind::CmsComplaint),
            "discovery_demand" => Ok(NoticeKind::DiscoveryDemand),
            "status_inquiry" => Ok(NoticeKind::StatusInquiry),
            other => Err(ClaimError::invalid_state(format!("unknown notice kind {other}"))),
        }
    }
}

/// A generated regulatory notice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub body: String,
    pub generated_at: DateTime<Utc>,
}

/// A denied claim under appeal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    /// Payer (insurer) name as it appears on the denial
    pub payer: String,
    /// Procedure title
    pub procedure: String,
    pub reason_code: ReasonCode,
    /// Amount at stake
    pub stake: Money,
    pub priority: Priority,
    pub status: ClaimStatus,
    pub submission: Submission,
    pub outcome: AdjudicationOutcome,
    /// Set only when the outcome is approved
    pub recovered_amount: Option<Money>,
    pub settled_at: Option<DateTime<Utc>>,
    /// Set once on first entry to `Drafted`
    pub due_at: Option<DateTime<Utc>>,
    pub strategy: Option<AppealStrategy>,
    /// Reference to the clinical narrative backing the appeal
    pub narrative_ref: Option<String>,
    /// Denial text recovered from a paper rejection
    pub denial_text: Option<String>,
    pub draft: Option<AppealDraft>,
    /// Highest appeal level reached; never goes back down
    #[serde(default)]
    pub tier: AppealTier,
    pub notices: Vec<Notice>,
    /// Append-only
    pub audit_log: Vec<AuditEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Stored revision this copy was loaded at, checked on save
    #[serde(default)]
    pub version: i64,
}

impl Claim {
    /// Creates a freshly detected denial in status `New`
    pub fn new(
        payer: impl Into<String>,
        procedure: impl Into<String>,
        reason_code: ReasonCode,
        stake: Money,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ClaimId::new_v7(),
            payer: payer.into(),
            procedure: procedure.into(),
            reason_code,
            stake,
            priority,
            status: ClaimStatus::New,
            submission: Submission::default(),
            outcome: AdjudicationOutcome::Pending,
            recovered_amount: None,
            settled_at: None,
            due_at: None,
            strategy: None,
            narrative_ref: None,
            denial_text: None,
            draft: None,
            tier: AppealTier::Level1,
            notices: Vec::new(),
            audit_log: Vec::new(),
            created_at,
            updated_at: created_at,
            version: 0,
        }
    }

    /// Moves the claim along a legal edge and appends an audit entry
    pub fn transition(
        &mut self,
        to: ClaimStatus,
        reason: impl Into<String>,
        actor: Actor,
        at: DateTime<Utc>,
    ) -> Result<(), ClaimError> {
        self.transition_with_flags(to, reason, actor, Vec::new(), at)
    }

    /// Same as [`Claim::transition`], attaching audit flags to the entry
    pub fn transition_with_flags(
        &mut self,
        to: ClaimStatus,
        reason: impl Into<String>,
        actor: Actor,
        flags: Vec<AuditFlag>,
        at: DateTime<Utc>,
    ) -> Result<(), ClaimError> {
        self.ensure_edge(to)?;
        let from = self.status;
        let tier = self.current_tier();
        self.status = to;
        self.tier = tier.max(self.current_tier());
        self.push_audit(from, to, reason.into(), actor, flags, at);
        Ok(())
    }

    /// Records an action that leaves the status unchanged
    pub fn note(&mut self, reason: impl Into<String>, actor: Actor, at: DateTime<Utc>) {
        let status = self.status;
        self.push_audit(status, status, reason.into(), actor, Vec::new(), at);
    }

    /// Validates an edge without applying it
    pub fn ensure_edge(&self, to: ClaimStatus) -> Result<(), ClaimError> {
        if self.status.is_terminal() {
            return Err(ClaimError::ClaimClosed(self.status.to_string()));
        }
        // drafting and transmission stay on the claim's appeal level
        let wrong_tier = matches!(
            to,
            ClaimStatus::Drafted
                | ClaimStatus::Submitted
                | ClaimStatus::DraftedL2
                | ClaimStatus::SubmittedL2
        ) && to.is_level_two() != (self.current_tier() == AppealTier::Level2);
        if !self.status.can_transition_to(to) || wrong_tier {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    /// Returns the due timestamp, computing it from the priority window the
    /// first time it is needed
    pub fn ensure_due_at(&mut self) -> Result<DateTime<Utc>, ClaimError> {
        match self.due_at {
            Some(due) => Ok(due),
            None => {
                let due = checked_deadline(self.created_at, self.priority.window())?;
                self.due_at = Some(due);
                Ok(due)
            }
        }
    }

    /// Settles an approved claim
    ///
    /// Uses `settled_amount` when the payer reported one, otherwise the full
    /// stake with the entry flagged as an assumed full recovery.
    pub fn settle(
        &mut self,
        settled_amount: Option<Money>,
        reason: impl Into<String>,
        actor: Actor,
        mut flags: Vec<AuditFlag>,
        at: DateTime<Utc>,
    ) -> Result<Money, ClaimError> {
        self.ensure_edge(ClaimStatus::Settled)?;
        let recovered = match settled_amount {
            Some(amount) => amount,
            None => {
                flags.push(AuditFlag::AssumedFullRecovery);
                self.stake
            }
        };
        self.outcome = AdjudicationOutcome::Approved;
        self.recovered_amount = Some(recovered);
        self.settled_at = Some(at);
        self.transition_with_flags(ClaimStatus::Settled, reason, actor, flags, at)?;
        Ok(recovered)
    }

    pub fn is_approved(&self) -> bool {
        self.outcome == AdjudicationOutcome::Approved
    }

    /// True while a transmitted appeal has not been confirmed delivered
    pub fn awaiting_delivery(&self) -> bool {
        self.status.is_transmitted()
            && self.submission.transmission_ref.is_some()
            && self.submission.delivery == DeliveryStatus::Pending
    }

    pub fn confirm_delivery(&mut self, at: DateTime<Utc>) {
        self.submission.delivery = DeliveryStatus::Delivered;
        self.updated_at = at;
    }

    pub fn mark_delivery_failed(&mut self, at: DateTime<Utc>) {
        self.submission.delivery = DeliveryStatus::Failed;
        self.updated_at = at;
    }

    /// Records a fresh transmission; delivery starts unconfirmed
    pub fn record_transmission(&mut self, transmission_ref: TransmissionRef, at: DateTime<Utc>) {
        self.submission.transmission_ref = Some(transmission_ref);
        self.submission.delivery = DeliveryStatus::Pending;
        self.submission.submitted_at = Some(at);
        self.updated_at = at;
    }

    /// Appeal level of the claim
    ///
    /// Level 2 statuses imply level 2; side statuses such as
    /// `HealingRequired` keep the level the claim had when it left the main
    /// path.
    pub fn current_tier(&self) -> AppealTier {
        if self.status.is_level_two() {
            AppealTier::Level2
        } else {
            self.tier
        }
    }

    /// Drafting status for the claim's appeal level
    pub fn drafted_status(&self) -> ClaimStatus {
        match self.current_tier() {
            AppealTier::Level1 => ClaimStatus::Drafted,
            AppealTier::Level2 => ClaimStatus::DraftedL2,
        }
    }

    /// Transmitted status for the claim's appeal level
    pub fn submitted_status(&self) -> ClaimStatus {
        match self.current_tier() {
            AppealTier::Level1 => ClaimStatus::Submitted,
            AppealTier::Level2 => ClaimStatus::SubmittedL2,
        }
    }

    pub fn set_draft(&mut self, draft: AppealDraft) {
        self.updated_at = draft.updated_at;
        self.draft = Some(draft);
    }

    pub fn add_notice(&mut self, kind: NoticeKind, body: String, at: DateTime<Utc>) {
        self.notices.push(Notice {
            kind,
            body,
            generated_at: at,
        });
        self.updated_at = at;
    }

    /// Most recent notice of the given kind
    pub fn latest_notice(&self, kind: NoticeKind) -> Option<&Notice> {
        self.notices.iter().rev().find(|n| n.kind == kind)
    }

    /// Reference used when querying payer systems
    pub fn payer_reference(&self) -> String {
        self.id.payer_reference()
    }

    fn push_audit(
        &mut self,
        from: ClaimStatus,
        to: ClaimStatus,
        reason: String,
        actor: Actor,
        flags: Vec<AuditFlag>,
        at: DateTime<Utc>,
    ) {
        self.audit_log.push(AuditEntry {
            id: AuditEntryId::new_v7(),
            claim_id: self.id,
            from,
            to,
            reason,
            actor,
            flags,
            recorded_at: at,
        });
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn claim() -> Claim {
        Claim::new(
            "Cigna",
            "MRI Lumbar Spine",
            ReasonCode::new("CO-197"),
            Money::usd(dec!(18500)),
            Priority::Urgent,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_terminal_statuses_have_no_edges() {
        for target in ClaimStatus::ALL {
            assert!(!ClaimStatus::Settled.can_transition_to(target));
            assert!(!ClaimStatus::CmsEscalated.can_transition_to(target));
        }
    }

    #[test]
    fn test_status_round_trips_through_storage_code() {
        for status in ClaimStatus::ALL {
            assert_eq!(status.as_str().parse::<ClaimStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_due_at_is_set_once() {
        let mut c = claim();
        let due = c.ensure_due_at().unwrap();
        assert_eq!(due, c.created_at + Duration::hours(72));
        c.priority = Priority::Standard;
        assert_eq!(c.ensure_due_at().unwrap(), due);
    }

    #[test]
    fn test_settle_without_amount_assumes_full_recovery() {
        let mut c = claim();
        c.status = ClaimStatus::Submitted;
        let at = c.created_at + Duration::days(1);
        let recovered = c.settle(None, "approved", Actor::Reconciler, vec![], at).unwrap();
        assert_eq!(recovered.amount(), dec!(18500));
        assert_eq!(c.outcome, AdjudicationOutcome::Approved);
        let entry = c.audit_log.last().unwrap();
        assert!(entry.flags.contains(&AuditFlag::AssumedFullRecovery));
    }

    #[test]
    fn test_settle_rejected_from_new() {
        let mut c = claim();
        let at = c.created_at;
        assert!(c.settle(None, "approved", Actor::Reconciler, vec![], at).is_err());
        assert!(c.recovered_amount.is_none());
        assert!(c.audit_log.is_empty());
    }

    #[test]
    fn test_level_two_claim_keeps_its_tier_through_healing() {
        let mut c = claim();
        c.status = ClaimStatus::SubmittedL2;
        let at = c.created_at;
        c.transition(ClaimStatus::HealingRequired, "fax failed", Actor::Reconciler, at)
            .unwrap();
        assert_eq!(c.tier, AppealTier::Level2);
        assert_eq!(c.drafted_status(), ClaimStatus::DraftedL2);

        let err = c
            .transition(ClaimStatus::Drafted, "healed", Actor::Reconciler, at)
            .unwrap_err();
        assert!(matches!(err, ClaimError::InvalidStatusTransition { .. }));
        c.transition(ClaimStatus::DraftedL2, "healed", Actor::Reconciler, at)
            .unwrap();
        assert_eq!(c.submitted_status(), ClaimStatus::SubmittedL2);
    }

    #[test]
    fn test_level_one_side_trip_returns_to_level_one() {
        let mut c = claim();
        c.status = ClaimStatus::Submitted;
        let at = c.created_at;
        c.transition(ClaimStatus::OcrRequired, "paper rejection", Actor::Reconciler, at)
            .unwrap();
        assert_eq!(c.current_tier(), AppealTier::Level1);
        assert!(c.ensure_edge(ClaimStatus::DraftedL2).is_err());
        assert!(c.ensure_edge(ClaimStatus::Drafted).is_ok());
        assert_eq!(c.drafted_status(), ClaimStatus::Drafted);
    }

    #[test]
    fn test_priority_parses_legacy_label() {
        assert_eq!("High Priority".parse::<Priority>().unwrap(), Priority::Urgent);
        assert_eq!("standard".parse::<Priority>().unwrap(), Priority::Standard);
    }
}
