//! Template-backed correspondence adapters
//!
//! Default implementations of the draft and complaint ports, rendering the
//! letters in `domain_claims::letters` against an injected clock.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{Clock, DomainPort, PortError};
use domain_claims::letters;
use domain_claims::{AppealStrategy, AppealTier, Claim, ComplaintGenerator, DraftGenerator};

pub struct TemplateDraftGenerator {
    clock: Arc<dyn Clock>,
}

impl TemplateDraftGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl DomainPort for TemplateDraftGenerator {}

#[async_trait]
impl DraftGenerator for TemplateDraftGenerator {
    async fn generate_appeal(
        &self,
        claim: &Claim,
        strategy: &AppealStrategy,
        tier: AppealTier,
    ) -> Result<String, PortError> {
        Ok(letters::appeal_letter(claim, strategy, tier, self.clock.now()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateComplaintGenerator;

impl DomainPort for TemplateComplaintGenerator {}

#[async_trait]
impl ComplaintGenerator for TemplateComplaintGenerator {
    async fn violation_notice(
        &self,
        claim: &Claim,
        today: DateTime<Utc>,
    ) -> Result<String, PortError> {
        Ok(letters::violation_notice(claim, today))
    }

    async fn cms_complaint(&self, claim: &Claim, today: DateTime<Utc>) -> Result<String, PortError> {
        Ok(letters::cms_complaint(claim, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::{FixedClock, Money};
    use domain_claims::{Priority, ReasonCode};
    use rust_decimal_macros::dec;

    fn claim() -> Claim {
        Claim::new(
            "Cigna",
            "MRI Lumbar Spine",
            ReasonCode::new("CO-197"),
            Money::usd(dec!(4200)),
            Priority::Urgent,
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_appeal_letter_dated_by_clock() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap()));
        let generator = TemplateDraftGenerator::new(clock);
        let text = generator
            .generate_appeal(&claim(), &AppealStrategy::PriorAuthorization, AppealTier::Level1)
            .await
            .unwrap();
        assert!(text.starts_with("DATE: 03/05/2026"));
        assert!(text.contains("FORMAL MEDICAL APPEAL"));
        assert!(text.contains("Cigna"));
    }

    #[tokio::test]
    async fn test_level2_heading() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let text = TemplateDraftGenerator::new(clock)
            .generate_appeal(&claim(), &AppealStrategy::default(), AppealTier::Level2)
            .await
            .unwrap();
        assert!(text.contains("SECOND LEVEL APPEAL"));
    }

    #[tokio::test]
    async fn test_violation_notice_names_window() {
        let text = TemplateComplaintGenerator
            .violation_notice(&claim(), Utc::now())
            .await
            .unwrap();
        assert!(text.contains("NOTICE OF REGULATORY NON-COMPLIANCE"));
        assert!(text.contains(Priority::Urgent.window_label()));
    }
}
