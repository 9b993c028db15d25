//! Event sinks

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use core_kernel::{DomainPort, PortError};
use domain_claims::{ClaimEvent, EventSink};

use super::fhir::status_error;

/// Writes each event as a structured log line
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl DomainPort for TracingEventSink {}

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: ClaimEvent) -> Result<(), PortError> {
        let detail = serde_json::to_string(&event.detail)
            .map_err(|e| PortError::transformation(e.to_string()))?;
        info!(
            event_id = %event.id,
            event = event.kind.as_str(),
            claim_id = %event.claim_id,
            payer = %event.payer,
            detail = %detail,
            "Claim event"
        );
        Ok(())
    }
}

/// Posts each event as JSON to a collaborator endpoint
#[derive(Debug)]
pub struct WebhookEventSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookEventSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl DomainPort for WebhookEventSink {}

#[async_trait]
impl EventSink for WebhookEventSink {
    async fn emit(&self, event: ClaimEvent) -> Result<(), PortError> {
        let response = self
            .client
            .post(&self.url)
            .json(&event)
            .send()
            .await
            .map_err(|e| PortError::Connection {
                message: format!("event webhook {} unreachable", self.url),
                source: Some(Box::new(e)),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error("event webhook", status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::Money;
    use domain_claims::{Claim, Priority, ReasonCode};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_tracing_sink_accepts_events() {
        let claim = Claim::new(
            "Aetna",
            "Knee Arthroscopy",
            ReasonCode::new("CO-50"),
            Money::usd(dec!(18500)),
            Priority::Standard,
            Utc::now(),
        );
        let event = ClaimEvent::victory(&claim, &claim.stake, Utc::now());
        assert!(TracingEventSink.emit(event).await.is_ok());
    }
}
