//! Escalation evaluator
//!
//! Decides the next lifecycle status from an adjudication read. Pure and
//! deterministic: "now" is always passed in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adjudication::AdjudicationOutcome;
use crate::claim::ClaimStatus;
use crate::error::ClaimError;

/// Result of evaluating a claim against an adjudication outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// No status change
    Hold,
    /// Move to `to`
    Advance { to: ClaimStatus, reason: String },
}

impl Verdict {
    fn advance(to: ClaimStatus, reason: impl Into<String>) -> Self {
        Verdict::Advance {
            to,
            reason: reason.into(),
        }
    }
}

/// Evaluates the escalation rules
///
/// # Arguments
///
/// * `status` - Current claim status
/// * `due_at` - Regulatory deadline, required only for the deadline rule
/// * `outcome` - Latest adjudication outcome
/// * `now` - Instant the batch is evaluated at
///
/// # Returns
///
/// `Verdict::Advance` when a rule fires, otherwise `Verdict::Hold`. A pending
/// `Submitted` claim without a due timestamp is `InvalidClaimState`.
pub fn evaluate(
    status: ClaimStatus,
    due_at: Option<DateTime<Utc>>,
    outcome: AdjudicationOutcome,
    now: DateTime<Utc>,
) -> Result<Verdict, ClaimError> {
    if !status.polls_adjudication() {
        return Ok(Verdict::Hold);
    }

    let verdict = match (outcome, status) {
        (AdjudicationOutcome::Approved, _) => {
            Verdict::advance(ClaimStatus::Settled, "payer approved the appeal")
        }
        (AdjudicationOutcome::Denied, ClaimStatus::Submitted | ClaimStatus::EscalatedL1) => {
            Verdict::advance(ClaimStatus::Level2Pending, "level 1 appeal denied")
        }
        (AdjudicationOutcome::Pending, ClaimStatus::Submitted) => {
            let due = due_at.ok_or_else(|| {
                ClaimError::invalid_state("submitted claim has no due timestamp")
            })?;
            if now > due {
                Verdict::advance(
                    ClaimStatus::EscalatedL1,
                    format!("regulatory window elapsed at {}", due.to_rfc3339()),
                )
            } else {
                Verdict::Hold
            }
        }
        _ => Verdict::Hold,
    };
    Ok(verdict)
}
