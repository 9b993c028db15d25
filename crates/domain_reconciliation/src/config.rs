//! Reconciler configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning knobs for one reconciliation batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Claims processed concurrently
    pub concurrency: usize,
    /// Overall batch deadline in milliseconds
    pub batch_deadline_ms: u64,
    /// Per-source adjudication timeout in milliseconds
    pub poll_timeout_ms: u64,
    /// Delivery status timeout in milliseconds
    pub delivery_timeout_ms: u64,
    /// Timeout for stores, draft and complaint generation, in milliseconds
    pub collaborator_timeout_ms: u64,
    /// Auto-draft standard priority denials as well as urgent ones
    pub auto_draft_standard: bool,
    /// Produce a synthetic pending report when every source fails (demo mode)
    pub synthetic_fallback: bool,
    /// Upper bound on rule applications per claim per batch
    pub max_steps: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            batch_deadline_ms: 120_000,
            poll_timeout_ms: 5_000,
            delivery_timeout_ms: 5_000,
            collaborator_timeout_ms: 10_000,
            auto_draft_standard: false,
            synthetic_fallback: false,
            max_steps: 8,
        }
    }
}

impl ReconcilerConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_batch_deadline(mut self, deadline: Duration) -> Self {
        self.batch_deadline_ms = saturating_millis(deadline);
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout_ms = saturating_millis(timeout);
        self
    }

    pub fn with_auto_draft_standard(mut self, enabled: bool) -> Self {
        self.auto_draft_standard = enabled;
        self
    }

    pub fn with_synthetic_fallback(mut self, enabled: bool) -> Self {
        self.synthetic_fallback = enabled;
        self
    }

    pub fn batch_deadline(&self) -> Duration {
        Duration::from_millis(self.batch_deadline_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }

    /// Concurrency never drops below one
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn effective_max_steps(&self) -> usize {
        self.max_steps.max(1)
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_conservative() {
        let config = ReconcilerConfig::default();
        assert!(!config.auto_draft_standard);
        assert!(!config.synthetic_fallback);
        assert_eq!(config.poll_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        assert_eq!(ReconcilerConfig::default().with_concurrency(0).effective_concurrency(), 1);
    }

    #[test]
    fn test_oversized_deadline_saturates() {
        let config = ReconcilerConfig::default().with_batch_deadline(Duration::MAX);
        assert_eq!(config.batch_deadline_ms, u64::MAX);
    }
}
