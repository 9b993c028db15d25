//! Custom Test Assertions
//!
//! Assertion helpers for claims and money that give more meaningful failure
//! messages than plain `assert_eq!`.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_claims::{AuditFlag, Claim, ClaimStatus};

/// Asserts that two Money values are approximately equal within a tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

pub fn assert_status(claim: &Claim, expected: ClaimStatus) {
    assert_eq!(
        claim.status, expected,
        "Claim {} expected in {}, found {}",
        claim.id, expected, claim.status
    );
}

/// Asserts the audit log chains: each transition starts where the previous ended
pub fn assert_audit_chain(claim: &Claim) {
    let transitions: Vec<_> = claim.audit_log.iter().filter(|e| e.is_transition()).collect();
    for pair in transitions.windows(2) {
        assert_eq!(
            pair[0].to, pair[1].from,
            "Audit log of {} breaks between {} and {}",
            claim.id, pair[0].to, pair[1].from
        );
    }
    if let Some(last) = transitions.last() {
        assert_eq!(last.to, claim.status, "Last audit entry does not match current status");
    }
}

/// Asserts exactly `count` status transitions were recorded
pub fn assert_transition_count(claim: &Claim, count: usize) {
    let actual = claim.audit_log.iter().filter(|e| e.is_transition()).count();
    assert_eq!(
        actual, count,
        "Claim {} has {} transitions, expected {}: {:?}",
        claim.id,
        actual,
        count,
        claim
            .audit_log
            .iter()
            .map(|e| format!("{} -> {}", e.from, e.to))
            .collect::<Vec<_>>()
    );
}

/// Asserts the settled invariant: approved outcome and a recovered amount
pub fn assert_settled(claim: &Claim, recovered: &Money) {
    assert_status(claim, ClaimStatus::Settled);
    assert!(claim.is_approved(), "Settled claim {} is not approved", claim.id);
    assert_eq!(claim.recovered_amount.as_ref(), Some(recovered));
    assert!(claim.settled_at.is_some());
}

pub fn assert_last_entry_flagged(claim: &Claim, flag: AuditFlag) {
    let last = claim.audit_log.last().expect("claim has no audit entries");
    assert!(
        last.flags.contains(&flag),
        "Expected flag '{}' on last entry, found {:?}",
        flag.as_str(),
        last.flags
    );
}
