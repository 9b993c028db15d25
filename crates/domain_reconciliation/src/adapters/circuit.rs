//! Circuit breaker shared by the HTTP adapters

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::warn;

use core_kernel::{CircuitBreakerConfig, PortError};

/// Opens after `failure_threshold` consecutive failures and lets a trial request
/// through once `reset_timeout_secs` has elapsed
#[derive(Debug)]
pub(crate) struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    is_open: AtomicBool,
    opened_at: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    pub(crate) fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            is_open: AtomicBool::new(false),
            opened_at: RwLock::new(None),
        }
    }

    pub(crate) async fn is_available(&self) -> bool {
        if !self.is_open.load(Ordering::Relaxed) {
            return true;
        }

        // Half-open once the reset timeout has elapsed
        let opened_at = self.opened_at.read().await;
        matches!(*opened_at, Some(at) if at.elapsed() >= Duration::from_secs(self.config.reset_timeout_secs))
    }

    /// Fails fast with `ServiceUnavailable` while open
    pub(crate) async fn guard(&self) -> Result<(), PortError> {
        if self.is_available().await {
            Ok(())
        } else {
            Err(PortError::ServiceUnavailable {
                service: format!("{} (circuit open)", self.name),
            })
        }
    }

    pub(crate) fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        let successes = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= u64::from(self.config.success_threshold) {
            self.is_open.store(false, Ordering::Relaxed);
            self.success_count.store(0, Ordering::Relaxed);
        }
    }

    pub(crate) async fn record_failure(&self) {
        self.success_count.store(0, Ordering::Relaxed);
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= u64::from(self.config.failure_threshold) {
            if !self.is_open.swap(true, Ordering::Relaxed) {
                warn!(adapter = %self.name, failures, "Circuit breaker opened");
            }
            *self.opened_at.write().await = Some(Instant::now());
        }
    }

    /// Records the outcome of a call; only transient errors count as failures
    pub(crate) async fn observe<T>(&self, result: &Result<T, PortError>) {
        match result {
            Ok(_) => self.record_success(),
            Err(err) if err.is_transient() => self.record_failure().await,
            Err(_) => {}
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.is_open.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, reset_secs: u64) -> CircuitBreaker {
        CircuitBreaker::new(
            "fhir",
            CircuitBreakerConfig {
                failure_threshold: threshold,
                reset_timeout_secs: reset_secs,
                success_threshold: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_opens_after_threshold() {
        let cb = breaker(2, 60);
        cb.record_failure().await;
        assert!(cb.is_available().await);
        cb.record_failure().await;
        assert!(!cb.is_available().await);
        assert!(matches!(cb.guard().await, Err(PortError::ServiceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_half_open_after_reset_timeout() {
        let cb = breaker(1, 0);
        cb.record_failure().await;
        assert!(cb.is_open());
        assert!(cb.is_available().await);
        cb.record_success();
        assert!(!cb.is_open());
    }

    #[tokio::test]
    async fn test_non_transient_errors_do_not_trip() {
        let cb = breaker(1, 60);
        let result: Result<(), PortError> = Err(PortError::transformation("bad bundle"));
        cb.observe(&result).await;
        assert!(!cb.is_open());
    }
}
