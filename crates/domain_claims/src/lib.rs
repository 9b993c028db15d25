//! Appeal Lifecycle Domain
//!
//! This crate models a denied healthcare claim as it is appealed: the claim
//! aggregate and its status machine, the audit trail, appeal strategies and
//! the rules that select them, payer transmission routes, the escalation
//! evaluator, and the correspondence templates.
//!
//! # Claim Lifecycle
//!
//! ```text
//! New -> Drafted -> Submitted -> Settled
//!                       |-> EscalatedL1 -> Level2Pending -> DraftedL2 -> SubmittedL2
//!                       |-> HealingRequired -> Drafted
//!                       |-> OcrRequired -> RefinementRequired -> Drafted
//!                       |-> DiscoveryPhase -> CmsEscalated
//! ```

pub mod adjudication;
pub mod audit;
pub mod claim;
pub mod error;
pub mod escalation;
pub mod events;
pub mod followup;
pub mod learning;
pub mod letters;
pub mod omnibus;
pub mod ports;
pub mod routing;
pub mod strategy;

pub use adjudication::{AdjudicationOutcome, AdjudicationReport, ReasonCode, ReportSource};
pub use audit::{Actor, AuditEntry, AuditFlag};
pub use claim::{
    AppealDraft, AppealTier, Claim, ClaimStatus, DeliveryStatus, Notice, NoticeKind, Priority,
    Submission, TransmissionRef,
};
pub use error::ClaimError;
pub use escalation::{evaluate, Verdict};
pub use events::{ClaimEvent, EventKind};
pub use followup::{stale_submissions, FollowUp};
pub use learning::{learn_from_edit, learn_from_victory};
pub use omnibus::{detect_patterns, OmnibusGroup};
pub use ports::{
    AdjudicationSource, ClaimStore, ComplaintGenerator, DeliveryTracker, DraftGenerator,
    EventSink, PayerRouteStore, StrategyRulesStore,
};
pub use routing::{PayerRoute, RouteProvenance};
pub use strategy::{AppealStrategy, RuleProvenance, StrategyRule};
