//! Property-Based Test Generators
//!
//! Proptest strategies for generating claims and their parts.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use core_kernel::{Currency, Money};
use domain_claims::{AdjudicationOutcome, Claim, ClaimStatus, Priority, ReasonCode};

use crate::builders::TestClaimBuilder;

pub fn status_strategy() -> impl Strategy<Value = ClaimStatus> {
    proptest::sample::select(ClaimStatus::ALL.to_vec())
}

pub fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::Urgent), Just(Priority::Standard)]
}

pub fn outcome_strategy() -> impl Strategy<Value = AdjudicationOutcome> {
    prop_oneof![
        Just(AdjudicationOutcome::Pending),
        Just(AdjudicationOutcome::Approved),
        Just(AdjudicationOutcome::Denied),
    ]
}

/// Stakes between $1.00 and $250,000.00
pub fn stake_strategy() -> impl Strategy<Value = Money> {
    (100i64..25_000_000i64).prop_map(|cents| Money::from_minor(cents, Currency::USD))
}

pub fn payer_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Aetna".to_string()),
        Just("Cigna".to_string()),
        Just("UnitedHealthcare".to_string()),
        Just("Humana".to_string()),
        "[A-Z][a-z]{3,10} Health",
    ]
}

pub fn reason_code_strategy() -> impl Strategy<Value = ReasonCode> {
    prop_oneof![
        Just(ReasonCode::new("CO-50")),
        Just(ReasonCode::new("CO-197")),
        Just(ReasonCode::new("CO-16")),
        Just(ReasonCode::unknown()),
    ]
}

/// Timestamps within 2026
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..365 * 24).prop_map(|hours| {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    })
}

/// Freshly detected denials
pub fn new_claim_strategy() -> impl Strategy<Value = Claim> {
    (
        payer_strategy(),
        reason_code_strategy(),
        stake_strategy(),
        priority_strategy(),
        timestamp_strategy(),
    )
        .prop_map(|(payer, code, stake, priority, at)| {
            TestClaimBuilder::new()
                .with_payer(payer)
                .with_reason_code(code)
                .with_stake(stake)
                .with_priority(priority)
                .with_created_at(at)
                .build()
        })
}
