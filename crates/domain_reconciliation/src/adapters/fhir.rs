//! FHIR Claim-Status Adapter
//!
//! Reads adjudication state from a payer's HL7 FHIR endpoint by searching
//! `ExplanationOfBenefit` resources for the claim's payer reference.
//!
//! # Mapping
//!
//! - `entry[0].resource.outcome` gives the outcome (`complete` is approved;
//!   `error`, `partial` and similar are denials; anything else is pending)
//! - `item[0].adjudication[0].reason.coding[0]` gives the reason code
//! - `payment.amount` gives the settled amount when the payer reports one
//! - an empty bundle means the payer has not decided yet
//!
//! # Error Handling
//!
//! - 401/403 -> `PortError::Unauthorized`
//! - 404 -> `PortError::NotFound`
//! - 5xx and 429 -> `PortError::ServiceUnavailable`
//! - client timeouts -> `PortError::Timeout`
//! - malformed bundles -> `PortError::Transformation`

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterConfig, AdapterHealth, Currency, DomainPort, HealthCheckResult, HealthCheckable, Money,
    PortError,
};
use domain_claims::{
    AdjudicationOutcome, AdjudicationReport, AdjudicationSource, ReasonCode, ReportSource,
};

use super::circuit::CircuitBreaker;

const FHIR_JSON: &str = "application/fhir+json";

/// FHIR `ExplanationOfBenefit` search adapter
#[derive(Debug)]
pub struct FhirAdjudicationSource {
    config: AdapterConfig,
    base_url: String,
    client: reqwest::Client,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
}

impl FhirAdjudicationSource {
    /// Creates the adapter; `config.base_url` is required
    pub fn new(config: AdapterConfig) -> Result<Self, PortError> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                PortError::validation_field("FHIR adapter requires a base URL", "base_url")
            })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PortError::internal(format!("failed to build HTTP client: {e}")))?;

        let circuit_breaker = config
            .circuit_breaker
            .clone()
            .map(|cb| Arc::new(CircuitBreaker::new(config.adapter_id.clone(), cb)));

        Ok(Self {
            config,
            base_url,
            client,
            circuit_breaker,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_circuit_open(&self) -> bool {
        self.circuit_breaker
            .as_ref()
            .map(|cb| cb.is_open())
            .unwrap_or(false)
    }

    async fn get_json<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, PortError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(cb) = &self.circuit_breaker {
            cb.guard().await?;
        }

        let result = self.send(url, query).await;
        if let Some(cb) = &self.circuit_breaker {
            cb.observe(&result).await;
        }
        let body = result?;

        serde_json::from_str(&body)
            .map_err(|e| PortError::transformation(format!("malformed FHIR response: {e}")))
    }

    async fn send(&self, url: &str, query: &[(&str, &str)]) -> Result<String, PortError> {
        let mut request = self.client.get(url).query(query).header(ACCEPT, FHIR_JSON);
        if let Some(token) = &self.config.bearer_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(&self.config.adapter_id, status));
        }
        response.text().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, err: reqwest::Error) -> PortError {
        if err.is_timeout() {
            PortError::timeout(format!("{} request", self.config.adapter_id), self.config.timeout())
        } else {
            PortError::Connection {
                message: format!("{} unreachable", self.config.adapter_id),
                source: Some(Box::new(err)),
            }
        }
    }
}

pub(crate) fn status_error(service: &str, status: StatusCode) -> PortError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized {
            message: format!("{service} rejected credentials ({status})"),
        },
        StatusCode::NOT_FOUND => PortError::not_found("resource", service),
        StatusCode::TOO_MANY_REQUESTS => PortError::ServiceUnavailable {
            service: format!("{service} (rate limited)"),
        },
        s if s.is_server_error() => PortError::ServiceUnavailable {
            service: format!("{service} ({status})"),
        },
        _ => PortError::internal(format!("{service} returned unexpected status {status}")),
    }
}

impl DomainPort for FhirAdjudicationSource {}

#[async_trait]
impl AdjudicationSource for FhirAdjudicationSource {
    fn name(&self) -> &str {
        &self.config.adapter_id
    }

    #[instrument(skip(self), fields(source = %self.config.adapter_id))]
    async fn fetch(&self, payer: &str, claim_ref: &str) -> Result<AdjudicationReport, PortError> {
        let url = format!("{}/ExplanationOfBenefit", self.base_url);
        let bundle: Bundle = self.get_json(&url, &[("identifier", claim_ref)]).await?;
        let report = report_from_bundle(bundle, &self.config.adapter_id)?;
        debug!(outcome = %report.outcome, reason = %report.reason_code, "EOB bundle mapped");
        Ok(report)
    }
}

#[async_trait]
impl HealthCheckable for FhirAdjudicationSource {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let checked_at = Utc::now();

        if self.is_circuit_open() {
            return HealthCheckResult {
                adapter_id: self.config.adapter_id.clone(),
                status: AdapterHealth::Degraded,
                latency_ms: 0,
                message: Some("Circuit breaker is open".to_string()),
                checked_at,
            };
        }

        let url = format!("{}/metadata", self.base_url);
        let result: Result<serde_json::Value, PortError> = self.get_json(&url, &[]).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: self.config.adapter_id.clone(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at,
            },
            Err(err) => HealthCheckResult {
                adapter_id: self.config.adapter_id.clone(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(err.to_string()),
                checked_at,
            },
        }
    }
}

// =============================================================================
// FHIR wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct Bundle {
    #[serde(default)]
    entry: Vec<BundleEntry>,
}

#[derive(Debug, Deserialize)]
struct BundleEntry {
    resource: ExplanationOfBenefit,
}

#[derive(Debug, Deserialize)]
struct ExplanationOfBenefit {
    outcome: Option<String>,
    disposition: Option<String>,
    #[serde(default)]
    item: Vec<EobItem>,
    payment: Option<EobPayment>,
}

#[derive(Debug, Deserialize)]
struct EobItem {
    #[serde(default)]
    adjudication: Vec<EobAdjudication>,
}

#[derive(Debug, Deserialize)]
struct EobAdjudication {
    reason: Option<CodeableConcept>,
}

#[derive(Debug, Deserialize)]
struct CodeableConcept {
    #[serde(default)]
    coding: Vec<Coding>,
}

#[derive(Debug, Deserialize)]
struct Coding {
    code: Option<String>,
    display: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EobPayment {
    amount: Option<FhirMoney>,
}

#[derive(Debug, Deserialize)]
struct FhirMoney {
    value: Decimal,
    currency: Option<String>,
}

fn report_from_bundle(bundle: Bundle, source: &str) -> Result<AdjudicationReport, PortError> {
    let vendor = ReportSource::Vendor(source.to_string());
    let Some(entry) = bundle.entry.into_iter().next() else {
        return Ok(AdjudicationReport::new(AdjudicationOutcome::Pending, vendor)
            .with_disposition("No ExplanationOfBenefit on file"));
    };
    let eob = entry.resource;

    let outcome = eob
        .outcome
        .as_deref()
        .map(AdjudicationOutcome::from_fhir)
        .unwrap_or(AdjudicationOutcome::Pending);

    let reason = eob
        .item
        .first()
        .and_then(|item| item.adjudication.first())
        .and_then(|adj| adj.reason.as_ref())
        .and_then(|reason| reason.coding.first())
        .and_then(|coding| coding.code.clone().or_else(|| coding.display.clone()))
        .map(ReasonCode::new)
        .unwrap_or_else(ReasonCode::unknown);

    let mut report = AdjudicationReport::new(outcome, vendor).with_reason(reason);
    if let Some(disposition) = eob.disposition {
        report = report.with_disposition(disposition);
    }
    if let Some(amount) = eob.payment.and_then(|p| p.amount) {
        let currency = match amount.currency.as_deref() {
            Some(code) => code.parse::<Currency>().map_err(|e| {
                PortError::transformation(format!("unsupported payment currency: {e}"))
            })?,
            None => Currency::USD,
        };
        report = report.with_settled_amount(Money::new(amount.value, currency));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> AdjudicationReport {
        let bundle: Bundle = serde_json::from_value(value).unwrap();
        report_from_bundle(bundle, "availity").unwrap()
    }

    #[test]
    fn test_empty_bundle_is_pending() {
        let report = parse(json!({ "resourceType": "Bundle", "total": 0 }));
        assert_eq!(report.outcome, AdjudicationOutcome::Pending);
        assert!(report.reason_code.is_unknown());
        assert_eq!(report.source, ReportSource::Vendor("availity".into()));
    }

    #[test]
    fn test_complete_with_payment() {
        let report = parse(json!({
            "entry": [{
                "resource": {
                    "resourceType": "ExplanationOfBenefit",
                    "outcome": "complete",
                    "payment": { "amount": { "value": 18500.00, "currency": "USD" } }
                }
            }]
        }));
        assert_eq!(report.outcome, AdjudicationOutcome::Approved);
        assert_eq!(report.settled_amount, Some(Money::usd(dec!(18500))));
    }

    #[test]
    fn test_denial_reason_extracted() {
        let report = parse(json!({
            "entry": [{
                "resource": {
                    "outcome": "error",
                    "disposition": "Not medically necessary",
                    "item": [{
                        "adjudication": [{
                            "reason": { "coding": [{ "code": "co-50", "display": "Medical necessity" }] }
                        }]
                    }]
                }
            }]
        }));
        assert_eq!(report.outcome, AdjudicationOutcome::Denied);
        assert_eq!(report.reason_code.as_str(), "CO-50");
        assert_eq!(report.disposition.as_deref(), Some("Not medically necessary"));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error("fhir", StatusCode::FORBIDDEN),
            PortError::Unauthorized { .. }
        ));
        assert!(status_error("fhir", StatusCode::BAD_GATEWAY).is_transient());
        assert!(status_error("fhir", StatusCode::NOT_FOUND).is_not_found());
    }

    #[test]
    fn test_requires_base_url() {
        let config = AdapterConfig::default();
        assert!(matches!(
            FhirAdjudicationSource::new(config),
            Err(PortError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transient() {
        let config = AdapterConfig::rest("local-fhir", "http://127.0.0.1:9").with_timeout_ms(500);
        let source = FhirAdjudicationSource::new(config).unwrap();
        let err = source.fetch("Aetna", "AUTO-1").await.unwrap_err();
        assert!(err.is_transient());
    }
}
