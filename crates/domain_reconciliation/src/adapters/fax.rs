//! Phaxio fax delivery tracker
//!
//! Looks up `GET {base}/faxes/{id}` with HTTP basic auth and maps
//! `data.status` onto [`DeliveryStatus`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use core_kernel::{CircuitBreakerConfig, DomainPort, PortError};
use domain_claims::{DeliveryStatus, DeliveryTracker, TransmissionRef};

use super::circuit::CircuitBreaker;
use super::fhir::status_error;

pub const PHAXIO_BASE_URL: &str = "https://api.phaxio.com/v2";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaxioConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

fn default_base_url() -> String {
    PHAXIO_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl PhaxioConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            timeout_ms: default_timeout_ms(),
            circuit_breaker: Some(CircuitBreakerConfig::default()),
        }
    }
}

#[derive(Debug)]
pub struct PhaxioDeliveryTracker {
    config: PhaxioConfig,
    client: reqwest::Client,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
}

impl PhaxioDeliveryTracker {
    pub fn new(config: PhaxioConfig) -> Result<Self, PortError> {
        if config.api_key.is_empty() {
            return Err(PortError::validation_field("Phaxio API key is required", "api_key"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| PortError::internal(format!("failed to build HTTP client: {e}")))?;
        let circuit_breaker = config
            .circuit_breaker
            .clone()
            .map(|cb| Arc::new(CircuitBreaker::new("phaxio", cb)));
        Ok(Self {
            config,
            client,
            circuit_breaker,
        })
    }

    async fn fetch_status(&self, fax_id: &str) -> Result<DeliveryStatus, PortError> {
        let url = format!("{}/faxes/{}", self.config.base_url.trim_end_matches('/'), fax_id);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PortError::timeout("phaxio.fax_status", Duration::from_millis(self.config.timeout_ms))
                } else {
                    PortError::Connection {
                        message: "phaxio unreachable".to_string(),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error("phaxio", status));
        }
        let body: FaxEnvelope = response
            .json()
            .await
            .map_err(|e| PortError::transformation(format!("malformed Phaxio response: {e}")))?;
        map_fax_status(&body.data.status)
    }
}

#[derive(Debug, Deserialize)]
struct FaxEnvelope {
    data: FaxData,
}

#[derive(Debug, Deserialize)]
struct FaxData {
    status: String,
}

fn map_fax_status(status: &str) -> Result<DeliveryStatus, PortError> {
    status
        .parse::<DeliveryStatus>()
        .map_err(|e| PortError::transformation(e.to_string()))
}

impl DomainPort for PhaxioDeliveryTracker {}

#[async_trait]
impl DeliveryTracker for PhaxioDeliveryTracker {
    #[instrument(skip(self), fields(transmission = %transmission_ref))]
    async fn status(&self, transmission_ref: &TransmissionRef) -> Result<DeliveryStatus, PortError> {
        if let Some(cb) = &self.circuit_breaker {
            cb.guard().await?;
        }
        let result = self.fetch_status(transmission_ref.as_str()).await;
        if let Some(cb) = &self.circuit_breaker {
            cb.observe(&result).await;
        }
        let status = result?;
        debug!(status = status.as_str(), "Fax status read");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fax_status_mapping() {
        assert_eq!(map_fax_status("success").unwrap(), DeliveryStatus::Delivered);
        assert_eq!(map_fax_status("failure").unwrap(), DeliveryStatus::Failed);
        assert_eq!(map_fax_status("queued").unwrap(), DeliveryStatus::Pending);
        assert_eq!(map_fax_status("inprogress").unwrap(), DeliveryStatus::Pending);
        assert!(matches!(
            map_fax_status("shredded"),
            Err(PortError::Transformation { .. })
        ));
    }

    #[test]
    fn test_envelope_parsing() {
        let body: FaxEnvelope = serde_json::from_str(
            r#"{"success":true,"message":"Metadata retrieved","data":{"id":123,"status":"failure"}}"#,
        )
        .unwrap();
        assert_eq!(body.data.status, "failure");
    }

    #[test]
    fn test_requires_api_key() {
        assert!(PhaxioDeliveryTracker::new(PhaxioConfig::new("", "secret")).is_err());
        assert!(PhaxioDeliveryTracker::new(PhaxioConfig::new("key", "secret")).is_ok());
    }
}
