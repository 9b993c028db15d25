//! Adjudication Poller
//!
//! Queries an ordered chain of claim-status sources and returns the first
//! report obtained. Each source runs under its own timeout; a timeout counts
//! as the source being unreachable.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use domain_claims::{AdjudicationReport, AdjudicationSource};

/// Result of polling every configured source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PollOutcome {
    Reported(AdjudicationReport),
    /// Every source failed; `attempted` lists them in order
    Unreachable { attempted: Vec<String> },
}

#[derive(Clone)]
pub struct AdjudicationPoller {
    sources: Vec<Arc<dyn AdjudicationSource>>,
    timeout: Duration,
    synthetic_fallback: bool,
}

impl AdjudicationPoller {
    /// Creates a poller over `sources`, tried in the given order
    pub fn new(sources: Vec<Arc<dyn AdjudicationSource>>, timeout: Duration) -> Self {
        Self {
            sources,
            timeout,
            synthetic_fallback: false,
        }
    }

    /// Enables the synthetic pending report when every source fails
    pub fn with_synthetic_fallback(mut self, enabled: bool) -> Self {
        self.synthetic_fallback = enabled;
        self
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Polls the sources in order; never errors
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub async fn poll(&self, payer: &str, claim_ref: &str) -> PollOutcome {
        let mut attempted = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            attempted.push(source.name().to_string());
            match tokio::time::timeout(self.timeout, source.fetch(payer, claim_ref)).await {
                Ok(Ok(report)) => {
                    debug!(source = source.name(), outcome = %report.outcome, "Adjudication report received");
                    return PollOutcome::Reported(report);
                }
                Ok(Err(err)) => {
                    warn!(source = source.name(), error = %err, "Adjudication source failed");
                }
                Err(_) => {
                    warn!(
                        source = source.name(),
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Adjudication source timed out"
                    );
                }
            }
        }

        if self.synthetic_fallback {
            debug!(claim_ref, "All sources failed, using synthetic report");
            return PollOutcome::Reported(AdjudicationReport::synthetic());
        }
        PollOutcome::Unreachable { attempted }
    }
}

impl std::fmt::Debug for AdjudicationPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdjudicationPoller")
            .field("sources", &self.source_names())
            .field("timeout", &self.timeout)
            .field("synthetic_fallback", &self.synthetic_fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::ports::mock::{MockAdjudicationSource, Scripted};
    use domain_claims::{AdjudicationOutcome, ReportSource};

    fn approved(source: &str) -> AdjudicationReport {
        AdjudicationReport::new(AdjudicationOutcome::Approved, ReportSource::Vendor(source.into()))
    }

    #[tokio::test]
    async fn test_falls_through_to_secondary() {
        let primary = Arc::new(MockAdjudicationSource::new("availity"));
        let secondary = Arc::new(MockAdjudicationSource::new("change-healthcare"));
        primary.script("AUTO-1", Scripted::Fail).await;
        secondary.respond("AUTO-1", approved("change-healthcare")).await;

        let poller = AdjudicationPoller::new(
            vec![primary.clone(), secondary.clone()],
            Duration::from_millis(200),
        );
        let outcome = poller.poll("Aetna", "AUTO-1").await;

        assert_eq!(outcome, PollOutcome::Reported(approved("change-healthcare")));
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 1);
    }

    #[tokio::test]
    async fn test_stops_at_first_report() {
        let primary = Arc::new(MockAdjudicationSource::new("availity"));
        let secondary = Arc::new(MockAdjudicationSource::new("change-healthcare"));
        primary.respond("AUTO-1", approved("availity")).await;

        let poller = AdjudicationPoller::new(
            vec![primary.clone(), secondary.clone()],
            Duration::from_millis(200),
        );
        poller.poll("Aetna", "AUTO-1").await;
        assert_eq!(secondary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_unreachable() {
        let primary = Arc::new(MockAdjudicationSource::new("availity"));
        primary.script("AUTO-1", Scripted::Hang(Duration::from_secs(5))).await;

        let poller = AdjudicationPoller::new(vec![primary], Duration::from_millis(50));
        let outcome = poller.poll("Aetna", "AUTO-1").await;
        assert_eq!(
            outcome,
            PollOutcome::Unreachable {
                attempted: vec!["availity".to_string()]
            }
        );
    }

    #[tokio::test]
    async fn test_synthetic_fallback() {
        let primary = Arc::new(MockAdjudicationSource::new("availity"));
        let poller = AdjudicationPoller::new(vec![primary], Duration::from_millis(50))
            .with_synthetic_fallback(true);

        match poller.poll("Aetna", "AUTO-1").await {
            PollOutcome::Reported(report) => {
                assert!(report.source.is_synthetic());
                assert_eq!(report.outcome, AdjudicationOutcome::Pending);
                assert!(report.reason_code.is_unknown());
            }
            other => panic!("expected synthetic report, got {other:?}"),
        }
    }
}
