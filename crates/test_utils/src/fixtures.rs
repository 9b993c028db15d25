//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for claims, payers, rules and routes. Fixed values
//! keep unit tests predictable; the `fake_*` helpers add variety where the
//! exact value does not matter.

use chrono::{DateTime, Duration, TimeZone, Utc};
use fake::faker::company::en::CompanyName;
use fake::Fake;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{ClaimId, Currency, Money};
use domain_claims::strategy::WILDCARD;
use domain_claims::{
    AppealStrategy, PayerRoute, ReasonCode, RouteProvenance, RuleProvenance, StrategyRule,
};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Stake of the canonical settlement scenario
    pub fn stake_18500() -> Money {
        Money::new(dec!(18500.00), Currency::USD)
    }

    pub fn stake_4200() -> Money {
        Money::new(dec!(4200.00), Currency::USD)
    }

    pub fn stake_45000() -> Money {
        Money::new(dec!(45000.00), Currency::USD)
    }

    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// When the standard test denial was detected (Mar 2, 2026 09:00 UTC)
    pub fn detected_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    /// One hour into the urgent window
    pub fn within_urgent_window() -> DateTime<Utc> {
        Self::detected_at() + Duration::hours(1)
    }

    /// Just past the 72h urgent window
    pub fn after_urgent_window() -> DateTime<Utc> {
        Self::detected_at() + Duration::hours(73)
    }

    /// Just past the 7 day standard window
    pub fn after_standard_window() -> DateTime<Utc> {
        Self::detected_at() + Duration::days(8)
    }
}

/// Fixture for payer names and denial codes
pub struct PayerFixtures;

impl PayerFixtures {
    pub fn cigna() -> &'static str {
        "Cigna"
    }

    pub fn aetna() -> &'static str {
        "Aetna"
    }

    pub fn united() -> &'static str {
        "UnitedHealthcare"
    }

    /// Medical necessity denial
    pub fn co_50() -> ReasonCode {
        ReasonCode::new("CO-50")
    }

    /// Prior authorization denial
    pub fn co_197() -> ReasonCode {
        ReasonCode::new("CO-197")
    }

    /// Random payer name
    pub fn fake_payer() -> String {
        format!("{} Health Plan", CompanyName().fake::<String>())
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Deterministic claim ID
    pub fn claim_id() -> ClaimId {
        ClaimId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }
}

/// Fixture for strategy rules
pub struct RuleFixtures;

impl RuleFixtures {
    pub fn rule(payer: &str, code: ReasonCode, strategy: AppealStrategy) -> StrategyRule {
        StrategyRule::new(
            payer,
            code,
            strategy,
            RuleProvenance::Manual,
            TemporalFixtures::detected_at(),
        )
    }

    /// Cigna-specific, wildcard and unrelated rules for precedence tests
    pub fn precedence_set() -> Vec<StrategyRule> {
        vec![
            Self::rule(WILDCARD, PayerFixtures::co_197(), AppealStrategy::PriorAuthorization),
            Self::rule(
                PayerFixtures::cigna(),
                PayerFixtures::co_197(),
                AppealStrategy::StepTherapy,
            ),
            Self::rule(WILDCARD, PayerFixtures::co_50(), AppealStrategy::CodingCorrection),
        ]
    }
}

/// Fixture for payer routes
pub struct RouteFixtures;

impl RouteFixtures {
    pub fn directory(payer: &str, fax: &str) -> PayerRoute {
        PayerRoute::new(
            payer,
            fax,
            "Appeals Department",
            RouteProvenance::Directory,
            TemporalFixtures::detected_at(),
        )
    }

    pub fn aetna() -> PayerRoute {
        Self::directory(PayerFixtures::aetna(), "1-860-555-0142")
    }
}
