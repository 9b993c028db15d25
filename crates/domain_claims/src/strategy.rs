//! Appeal strategies and the rules that select them
//!
//! A strategy decides how the justification section of an appeal is argued.
//! Each strategy maps to one pure formatting function; learned playbooks are
//! carried as `Custom` text.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adjudication::ReasonCode;
use crate::claim::Claim;

/// Payer value that matches every payer
pub const WILDCARD: &str = "*";

/// How an appeal argues its case
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppealStrategy {
    #[default]
    GeneralMedicalNecessity,
    StepTherapy,
    PriorAuthorization,
    CodingCorrection,
    TimelyFiling,
    /// Learned free-text playbook
    Custom(String),
}

impl AppealStrategy {
    /// Storage code for built-in strategies; the label itself for `Custom`
    pub fn code(&self) -> &str {
        match self {
            AppealStrategy::GeneralMedicalNecessity => "GENERAL_MEDICAL_NECESSITY",
            AppealStrategy::StepTherapy => "STEP_THERAPY",
            AppealStrategy::PriorAuthorization => "PRIOR_AUTHORIZATION",
            AppealStrategy::CodingCorrection => "CODING_CORRECTION",
            AppealStrategy::TimelyFiling => "TIMELY_FILING",
            AppealStrategy::Custom(label) => label,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, AppealStrategy::Custom(_))
    }

    fn renderer(&self) -> JustificationFn {
        match self {
            AppealStrategy::GeneralMedicalNecessity => medical_necessity,
            AppealStrategy::StepTherapy => step_therapy,
            AppealStrategy::PriorAuthorization => prior_authorization,
            AppealStrategy::CodingCorrection => coding_correction,
            AppealStrategy::TimelyFiling => timely_filing,
            AppealStrategy::Custom(_) => custom_playbook,
        }
    }

    /// Renders the justification section of an appeal for `claim`
    pub fn render_justification(&self, claim: &Claim) -> String {
        let label = match self {
            AppealStrategy::Custom(label) => Some(label.as_str()),
            _ => None,
        };
        (self.renderer())(claim, label)
    }
}

impl From<String> for AppealStrategy {
    fn from(value: String) -> Self {
        match value.trim() {
            "GENERAL_MEDICAL_NECESSITY" => AppealStrategy::GeneralMedicalNecessity,
            "STEP_THERAPY" => AppealStrategy::StepTherapy,
            "PRIOR_AUTHORIZATION" => AppealStrategy::PriorAuthorization,
            "CODING_CORRECTION" => AppealStrategy::CodingCorrection,
            "TIMELY_FILING" => AppealStrategy::TimelyFiling,
            _ => AppealStrategy::Custom(value),
        }
    }
}

impl From<AppealStrategy> for String {
    fn from(value: AppealStrategy) -> Self {
        value.code().to_string()
    }
}

impl FromStr for AppealStrategy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AppealStrategy::from(s.to_string()))
    }
}

impl fmt::Display for AppealStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

type JustificationFn = fn(&Claim, Option<&str>) -> String;

fn medical_necessity(claim: &Claim, _: Option<&str>) -> String {
    let evidence = match &claim.narrative_ref {
        Some(reference) => format!("The attached clinical narrative ({reference}) documents"),
        None => "The treating physician's records document".to_string(),
    };
    format!(
        "CLINICAL NECESSITY JUSTIFICATION:\n{evidence} that {procedure} is medically necessary \
         and consistent with accepted standards of care. The denial ({code}) does not cite the \
         specific clinical criteria the request failed to meet.",
        procedure = claim.procedure,
        code = claim.reason_code,
    )
}

fn step_therapy(claim: &Claim, _: Option<&str>) -> String {
    format!(
        "STEP THERAPY EXCEPTION:\nThe patient has already failed or cannot tolerate the \
         lower-step alternatives required before {procedure}. Continuing a step protocol that \
         is expected to be ineffective exposes the patient to avoidable harm. We request an \
         exception to the step therapy requirement cited in denial {code}.",
        procedure = claim.procedure,
        code = claim.reason_code,
    )
}

fn prior_authorization(claim: &Claim, _: Option<&str>) -> String {
    format!(
        "PRIOR AUTHORIZATION COMPLIANCE:\nUnder CMS-0057-F, {payer} must return a specific, \
         actionable reason for a prior authorization denial through the mandated FHIR API. \
         Denial {code} for {procedure} provides no such granular justification.",
        payer = claim.payer,
        code = claim.reason_code,
        procedure = claim.procedure,
    )
}

fn coding_correction(claim: &Claim, _: Option<&str>) -> String {
    format!(
        "CODING REVIEW:\nThe services billed for {procedure} were coded in accordance with \
         current CPT and ICD-10 guidance. Denial {code} appears to rest on a coding \
         misinterpretation; corrected documentation is enclosed for redetermination.",
        procedure = claim.procedure,
        code = claim.reason_code,
    )
}

fn timely_filing(claim: &Claim, _: Option<&str>) -> String {
    format!(
        "TIMELY FILING:\nThe original claim for {procedure} was filed within the contractual \
         filing limit. Proof of timely submission is enclosed and denial {code} should be \
         reversed.",
        procedure = claim.procedure,
        code = claim.reason_code,
    )
}

fn custom_playbook(claim: &Claim, label: Option<&str>) -> String {
    match label {
        Some(playbook) if !playbook.trim().is_empty() => {
            format!("CLINICAL DEFENSE:\n{}", playbook.trim())
        }
        _ => medical_necessity(claim, None),
    }
}

/// Where a rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleProvenance {
    /// Entered by an operator
    Manual,
    /// Learned from a physician edit
    PhysicianEdit,
    /// Recorded after an approved appeal
    ProvenWinner,
}

impl RuleProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleProvenance::Manual => "manual",
            RuleProvenance::PhysicianEdit => "physician_edit",
            RuleProvenance::ProvenWinner => "proven_winner",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "physician_edit" => RuleProvenance::PhysicianEdit,
            "proven_winner" => RuleProvenance::ProvenWinner,
            _ => RuleProvenance::Manual,
        }
    }
}

/// (payer or wildcard, reason code) -> strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRule {
    pub payer: String,
    pub reason_code: ReasonCode,
    pub strategy: AppealStrategy,
    pub provenance: RuleProvenance,
    pub updated_at: DateTime<Utc>,
}

impl StrategyRule {
    pub fn new(
        payer: impl Into<String>,
        reason_code: ReasonCode,
        strategy: AppealStrategy,
        provenance: RuleProvenance,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            payer: payer.into(),
            reason_code,
            strategy,
            provenance,
            updated_at,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.payer == WILDCARD
    }

    /// Rules are keyed by payer (case-insensitive) and reason code
    pub fn same_key(&self, payer: &str, reason_code: &ReasonCode) -> bool {
        self.payer.eq_ignore_ascii_case(payer) && &self.reason_code == reason_code
    }
}

/// Resolves a strategy: exact payer rule, then wildcard rule, then the default
pub fn resolve_strategy(
    rules: &[StrategyRule],
    payer: &str,
    reason_code: &ReasonCode,
) -> AppealStrategy {
    rules
        .iter()
        .find(|rule| !rule.is_wildcard() && rule.same_key(payer, reason_code))
        .or_else(|| rules.iter().find(|rule| rule.same_key(WILDCARD, reason_code)))
        .map(|rule| rule.strategy.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::Priority;
    use core_kernel::Money;
    use rust_decimal_macros::dec;

    fn sample_claim() -> Claim {
        Claim::new(
            "Aetna",
            "Knee Arthroscopy",
            ReasonCode::new("CO-50"),
            Money::usd(dec!(4200)),
            Priority::Standard,
            Utc::now(),
        )
    }

    fn rule(payer: &str, code: &str, strategy: AppealStrategy) -> StrategyRule {
        StrategyRule::new(payer, ReasonCode::new(code), strategy, RuleProvenance::Manual, Utc::now())
    }

    #[test]
    fn test_payer_rule_beats_wildcard() {
        let rules = vec![
            rule(WILDCARD, "CO-197", AppealStrategy::PriorAuthorization),
            rule("Cigna", "CO-197", AppealStrategy::StepTherapy),
        ];
        let code = ReasonCode::new("CO-197");
        assert_eq!(resolve_strategy(&rules, "cigna", &code), AppealStrategy::StepTherapy);
        assert_eq!(resolve_strategy(&rules, "Aetna", &code), AppealStrategy::PriorAuthorization);
        assert_eq!(
            resolve_strategy(&rules, "Aetna", &ReasonCode::new("CO-50")),
            AppealStrategy::GeneralMedicalNecessity
        );
    }

    #[test]
    fn test_strategy_codes_round_trip() {
        let strategies = [
            AppealStrategy::GeneralMedicalNecessity,
            AppealStrategy::StepTherapy,
            AppealStrategy::PriorAuthorization,
            AppealStrategy::CodingCorrection,
            AppealStrategy::TimelyFiling,
            AppealStrategy::Custom("Physician-Verified Defense: cite MCG".into()),
        ];
        for strategy in strategies {
            assert_eq!(AppealStrategy::from(String::from(strategy.clone())), strategy);
        }
    }

    #[test]
    fn test_each_strategy_renders_its_own_section() {
        let claim = sample_claim();
        let cases = [
            (AppealStrategy::GeneralMedicalNecessity, "CLINICAL NECESSITY JUSTIFICATION:"),
            (AppealStrategy::StepTherapy, "STEP THERAPY EXCEPTION:"),
            (AppealStrategy::PriorAuthorization, "PRIOR AUTHORIZATION COMPLIANCE:"),
            (AppealStrategy::CodingCorrection, "CODING REVIEW:"),
            (AppealStrategy::TimelyFiling, "TIMELY FILING:"),
            (AppealStrategy::Custom("Cite MCG criteria".into()), "CLINICAL DEFENSE:"),
            (AppealStrategy::Custom("  ".into()), "CLINICAL NECESSITY JUSTIFICATION:"),
        ];
        for (strategy, heading) in cases {
            let section = strategy.render_justification(&claim);
            assert!(section.starts_with(heading), "{strategy}: {section}");
        }
    }
}
