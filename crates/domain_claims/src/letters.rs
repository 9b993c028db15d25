//! Correspondence templates
//!
//! Pure text renderers for the letters the lifecycle produces. Layout and
//! delivery are handled elsewhere; these only produce plain text.

use chrono::{DateTime, Utc};

use core_kernel::Money;

use crate::claim::{AppealTier, Claim};
use crate::strategy::AppealStrategy;

const SIGNATURE: &str = "Automated Compliance Engine\nCMS Compliance Bridge";

fn date(at: DateTime<Utc>) -> String {
    at.format("%m/%d/%Y").to_string()
}

/// Appeal letter for the given tier, argued with `strategy`
pub fn appeal_letter(
    claim: &Claim,
    strategy: &AppealStrategy,
    tier: AppealTier,
    today: DateTime<Utc>,
) -> String {
    let heading = match tier {
        AppealTier::Level1 => "FORMAL MEDICAL APPEAL",
        AppealTier::Level2 => "SECOND LEVEL APPEAL / REQUEST FOR EXTERNAL REVIEW",
    };
    let prior = match tier {
        AppealTier::Level1 => String::new(),
        AppealTier::Level2 => {
            "Our first level appeal was denied without a granular clinical justification. \
             We now request a second level review by an independent physician reviewer.\n\n"
                .to_string()
        }
    };
    format!(
        "DATE: {today}\n\
         TO: {payer} - Claims & Appeals Department\n\
         RE: {heading} - Claim #{reference}\n\
         Procedure: {procedure} | Denial code: {code}\n\n\
         Dear Claims Review Committee,\n\n\
         This letter is a formal appeal of the denial of Claim #{reference}.\n\n\
         {prior}{justification}\n\n\
         REGULATORY COMPLIANCE:\n\
         Per the CMS Interoperability and Prior Authorization Final Rule (CMS-0057-F), payers \
         must provide specific, actionable reasons for denials via standardized HL7 FHIR APIs.\n\n\
         We request an immediate redetermination.\n\n\
         Sincerely,\n{SIGNATURE}",
        today = date(today),
        payer = claim.payer,
        reference = claim.payer_reference(),
        procedure = claim.procedure,
        code = claim.reason_code,
        justification = strategy.render_justification(claim),
    )
}

/// Notice of violation sent to the payer when the decision window elapses
pub fn violation_notice(claim: &Claim, today: DateTime<Utc>) -> String {
    format!(
        "DATE: {today}\n\
         TO: {payer} - Compliance & Legal Department\n\
         RE: NOTICE OF REGULATORY NON-COMPLIANCE - Claim #{reference}\n\
         MANDATE: CMS-0057-F Interoperability & Prior Authorization Violation\n\n\
         Dear Compliance Officer,\n\n\
         Under CMS-0057-F your organization must decide this request within {window}. \
         As of {today} the regulatory window for this claim has expired without a compliant \
         decision. We request an immediate expedited redetermination and a written explanation \
         for the delay.\n\n\
         Sincerely,\n{SIGNATURE}",
        today = date(today),
        payer = claim.payer,
        reference = claim.payer_reference(),
        window = claim.priority.window_label(),
    )
}

/// Complaint filed with the CMS regional office
pub fn cms_complaint(claim: &Claim, today: DateTime<Utc>) -> String {
    let submitted = claim
        .submission
        .submitted_at
        .map(date)
        .unwrap_or_else(|| "an unrecorded date".to_string());
    let deadline = claim
        .due_at
        .map(date)
        .unwrap_or_else(|| "the regulatory deadline".to_string());
    format!(
        "DATE: {today}\n\
         TO: Centers for Medicare & Medicaid Services (CMS) - Regional Office\n\
         RE: FORMAL REGULATORY COMPLAINT - SECTION 422.568 (CMS-0057-F)\n\
         Payer: {payer}\n\
         Claim ID: {reference}\n\n\
         NARRATIVE OF VIOLATION:\n\
         The above payer has failed to provide a timely redetermination for a clinical appeal \
         submitted on {submitted}. The payer was required to respond by {deadline}. No granular \
         clinical justification has been received.\n\n\
         REQUESTED ACTION:\n\
         We request an audit of this payer's adjudication timelines for {procedure}.\n\n\
         Respectfully Submitted,\n{SIGNATURE}",
        today = date(today),
        payer = claim.payer,
        reference = claim.payer_reference(),
        procedure = claim.procedure,
    )
}

/// Formal information demand issued when entering discovery
pub fn discovery_demand(claim: &Claim, today: DateTime<Utc>) -> String {
    format!(
        "DATE: {today}\n\
         TO: {payer} - Legal Department / Compliance Office\n\
         RE: FORMAL DISCOVERY REQUEST & INFORMATION DEMAND\n\
         Claim ID: {reference} | Procedure: {procedure}\n\
         MANDATE: CMS-0057-F & ERISA Section 503\n\n\
         Dear Legal Counsel,\n\n\
         We demand the production of:\n\
         1. The complete clinical record used for this determination.\n\
         2. The specific criteria applied to this procedure.\n\
         3. The credentials of the reviewing physician.\n\n\
         Failure to produce these documents within 72 hours will be reported to the CMS \
         Regional Office and state insurance regulators.\n\n\
         Respectfully,\n{SIGNATURE}",
        today = date(today),
        payer = claim.payer,
        reference = claim.payer_reference(),
        procedure = claim.procedure,
    )
}

/// Second-notice status inquiry for a stale submission
pub fn status_inquiry(claim: &Claim, today: DateTime<Utc>) -> String {
    let submitted = claim
        .submission
        .submitted_at
        .map(date)
        .unwrap_or_else(|| "an unrecorded date".to_string());
    format!(
        "DATE: {today}\n\
         TO: {payer} - Appeals Department\n\
         RE: STATUS INQUIRY / SECOND NOTICE - Claim #{reference}\n\
         Regulatory Mandate: CMS-0057-F (72h/7d Adjudication Window)\n\n\
         This is a formal inquiry regarding the clinical appeal submitted on {submitted}. \
         Please provide an immediate status update via FHIR or return fax.\n\n\
         Respectfully,\n{SIGNATURE}",
        today = date(today),
        payer = claim.payer,
        reference = claim.payer_reference(),
    )
}

/// Consolidated notice for a systemic denial pattern
pub fn omnibus_notice(
    payer: &str,
    procedure: &str,
    claims: &[&Claim],
    total: &Money,
    today: DateTime<Utc>,
) -> String {
    let lines: Vec<String> = claims
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. Claim ID: {} | Value: {}", i + 1, c.payer_reference(), c.stake))
        .collect();
    format!(
        "DATE: {today}\n\
         NOTICE OF SYSTEMIC REGULATORY NON-COMPLIANCE\n\
         FOR ATTENTION OF: {payer_upper} COMPLIANCE & LEGAL DEPT\n\n\
         PROCEDURE: {procedure}\n\
         TOTAL AGGREGATE IMPACT: {total}\n\n\
         PATTERN ANALYSIS:\n\
         {count} separate denials of {procedure} by {payer} lack the granular clinical \
         justification mandated by CMS-0057-F.\n\n\
         AFFECTED CLAIMS SUMMARY:\n{lines}\n\n\
         REGULATORY DEMAND:\n\
         Failure to resolve this pattern within 72 hours will result in escalation to CMS and \
         the relevant State Department of Insurance.",
        today = date(today),
        payer_upper = payer.to_uppercase(),
        count = claims.len(),
        lines = lines.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjudication::ReasonCode;
    use crate::claim::Priority;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn claim() -> Claim {
        Claim::new(
            "Aetna",
            "Knee Arthroscopy",
            ReasonCode::new("CO-50"),
            Money::usd(dec!(12000)),
            Priority::Standard,
            Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_violation_notice_uses_priority_window() {
        let text = violation_notice(&claim(), Utc.with_ymd_and_hms(2025, 4, 9, 0, 0, 0).unwrap());
        assert!(text.contains("7 calendar days"));
        assert!(text.contains("04/09/2025"));
    }

    #[test]
    fn test_level_two_letter_mentions_external_review() {
        let c = claim();
        let text = appeal_letter(&c, &AppealStrategy::StepTherapy, AppealTier::Level2, c.created_at);
        assert!(text.contains("SECOND LEVEL APPEAL"));
        assert!(text.contains("STEP THERAPY EXCEPTION"));
        assert!(text.contains(&c.payer_reference()));
    }
}
