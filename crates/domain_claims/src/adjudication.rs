//! Adjudication results reported by payers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use core_kernel::Money;

/// Normalized payer decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjudicationOutcome {
    Pending,
    Approved,
    Denied,
}

impl AdjudicationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjudicationOutcome::Pending => "pending",
            AdjudicationOutcome::Approved => "approved",
            AdjudicationOutcome::Denied => "denied",
        }
    }

    /// Maps a FHIR `ExplanationOfBenefit.outcome` code
    ///
    /// `complete` is an approval, `error` and `partial` are treated as denials,
    /// `queued` and anything unrecognised stay pending.
    pub fn from_fhir(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "complete" | "approved" => AdjudicationOutcome::Approved,
            "error" | "partial" | "rejected" | "denied" => AdjudicationOutcome::Denied,
            _ => AdjudicationOutcome::Pending,
        }
    }
}

impl fmt::Display for AdjudicationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjudicationOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AdjudicationOutcome::Pending),
            "approved" => Ok(AdjudicationOutcome::Approved),
            "denied" => Ok(AdjudicationOutcome::Denied),
            other => Err(format!("unknown adjudication outcome {other}")),
        }
    }
}

/// Denial reason code (CARC/RARC style, e.g. `CO-197`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonCode(String);

impl ReasonCode {
    /// Sentinel used when no source supplied a code
    pub const UNKNOWN: &'static str = "UNKNOWN";

    /// Normalizes to trimmed upper case; blank input becomes `UNKNOWN`
    pub fn new(code: impl AsRef<str>) -> Self {
        let normalized = code.as_ref().trim().to_ascii_uppercase();
        if normalized.is_empty() {
            Self::unknown()
        } else {
            Self(normalized)
        }
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an adjudication report came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ReportSource {
    /// A named claim-status source (FHIR vendor)
    Vendor(String),
    /// Deterministic placeholder produced when every source failed
    Synthetic,
}

impl ReportSource {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, ReportSource::Synthetic)
    }
}

impl fmt::Display for ReportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportSource::Vendor(name) => f.write_str(name),
            ReportSource::Synthetic => f.write_str("SYNTHETIC"),
        }
    }
}

/// Normalized result of one adjudication read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjudicationReport {
    pub outcome: AdjudicationOutcome,
    pub reason_code: ReasonCode,
    /// Free-text disposition from the payer
    pub disposition: Option<String>,
    pub source: ReportSource,
    /// Amount the payer reported paying, when known
    pub settled_amount: Option<Money>,
}

impl AdjudicationReport {
    pub fn new(outcome: AdjudicationOutcome, source: ReportSource) -> Self {
        Self {
            outcome,
            reason_code: ReasonCode::unknown(),
            disposition: None,
            source,
            settled_amount: None,
        }
    }

    pub fn with_reason(mut self, reason_code: ReasonCode) -> Self {
        self.reason_code = reason_code;
        self
    }

    pub fn with_disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = Some(disposition.into());
        self
    }

    pub fn with_settled_amount(mut self, amount: Money) -> Self {
        self.settled_amount = Some(amount);
        self
    }

    /// Report used when no source answered
    pub fn synthetic() -> Self {
        Self::new(AdjudicationOutcome::Pending, ReportSource::Synthetic)
            .with_disposition("No adjudication source reachable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_code_normalization() {
        assert_eq!(ReasonCode::new(" co-197 ").as_str(), "CO-197");
        assert!(ReasonCode::new("   ").is_unknown());
    }

    #[test]
    fn test_fhir_outcome_mapping() {
        assert_eq!(AdjudicationOutcome::from_fhir("complete"), AdjudicationOutcome::Approved);
        assert_eq!(AdjudicationOutcome::from_fhir("partial"), AdjudicationOutcome::Denied);
        assert_eq!(AdjudicationOutcome::from_fhir("queued"), AdjudicationOutcome::Pending);
    }

    #[test]
    fn test_synthetic_report_is_pending_unknown() {
        let report = AdjudicationReport::synthetic();
        assert_eq!(report.outcome, AdjudicationOutcome::Pending);
        assert!(report.reason_code.is_unknown());
        assert!(report.source.is_synthetic());
    }
}
