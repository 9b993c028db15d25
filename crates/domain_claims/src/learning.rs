//! Strategy learning
//!
//! Turns outcomes and physician edits into strategy rules. These functions
//! only build the rule; persisting it is the caller's job.

use chrono::{DateTime, Utc};

use crate::claim::Claim;
use crate::strategy::{AppealStrategy, RuleProvenance, StrategyRule};

/// Maximum characters of physician text kept in a learned playbook
pub const MAX_LEARNED_CHARS: usize = 500;

/// Rule recording the strategy that won an approved appeal
///
/// Returns `None` unless the claim is settled with an approved outcome.
pub fn learn_from_victory(claim: &Claim, at: DateTime<Utc>) -> Option<StrategyRule> {
    if claim.recovered_amount.is_none() || !claim.is_approved() {
        return None;
    }
    let winning = claim
        .draft
        .as_ref()
        .map(|d| d.strategy.clone())
        .or_else(|| claim.strategy.clone())
        .unwrap_or_default();
    Some(StrategyRule::new(
        claim.payer.clone(),
        claim.reason_code.clone(),
        winning,
        RuleProvenance::ProvenWinner,
        at,
    ))
}

/// Rule capturing a physician's edited appeal as a custom playbook
pub fn learn_from_edit(claim: &Claim, edited_text: &str, at: DateTime<Utc>) -> StrategyRule {
    let excerpt: String = edited_text.trim().chars().take(MAX_LEARNED_CHARS).collect();
    StrategyRule::new(
        claim.payer.clone(),
        claim.reason_code.clone(),
        AppealStrategy::Custom(format!("Physician-Verified Defense: {excerpt}")),
        RuleProvenance::PhysicianEdit,
        at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjudication::ReasonCode;
    use crate::audit::Actor;
    use crate::claim::{ClaimStatus, Priority};
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

    #[test]
    fn test_edit_is_truncated() {
        let text = "x".repeat(900);
        let rule = learn_from_edit(&claim(), &text, Utc::now());
        match rule.strategy {
            AppealStrategy::Custom(label) => {
                assert_eq!(label.chars().filter(|c| *c == 'x').count(), MAX_LEARNED_CHARS)
            }
            other => panic!("expected custom strategy, got {other:?}"),
        }
        assert_eq!(rule.provenance, RuleProvenance::PhysicianEdit);
    }

    #[test]
    fn test_victory_requires_settlement() {
        let mut c = claim();
        assert!(learn_from_victory(&c, Utc::now()).is_none());

        c.status = ClaimStatus::Submitted;
        c.strategy = Some(AppealStrategy::StepTherapy);
        c.settle(None, "approved", Actor::Reconciler, vec![], Utc::now()).unwrap();
        let rule = learn_from_victory(&c, Utc::now()).unwrap();
        assert_eq!(rule.strategy, AppealStrategy::StepTherapy);
        assert_eq!(rule.provenance, RuleProvenance::ProvenWinner);
    }
}
