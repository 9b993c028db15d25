//! Transmission Monitor

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use domain_claims::{DeliveryStatus, DeliveryTracker, TransmissionRef};

/// What the monitor learned about a transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryCheck {
    Delivered,
    Failed,
    Pending,
    /// Tracker errored or timed out; treated as no information
    Unavailable,
}

#[derive(Clone)]
pub struct TransmissionMonitor {
    tracker: Arc<dyn DeliveryTracker>,
    timeout: Duration,
}

impl TransmissionMonitor {
    pub fn new(tracker: Arc<dyn DeliveryTracker>, timeout: Duration) -> Self {
        Self { tracker, timeout }
    }

    #[instrument(skip(self), fields(transmission = %transmission_ref))]
    pub async fn check_delivery(&self, transmission_ref: &TransmissionRef) -> DeliveryCheck {
        match tokio::time::timeout(self.timeout, self.tracker.status(transmission_ref)).await {
            Ok(Ok(DeliveryStatus::Delivered)) => DeliveryCheck::Delivered,
            Ok(Ok(DeliveryStatus::Failed)) => DeliveryCheck::Failed,
            Ok(Ok(DeliveryStatus::Pending)) => DeliveryCheck::Pending,
            Ok(Err(err)) => {
                warn!(error = %err, "Delivery status lookup failed");
                DeliveryCheck::Unavailable
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Delivery status lookup timed out");
                DeliveryCheck::Unavailable
            }
        }
    }
}

impl std::fmt::Debug for TransmissionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransmissionMonitor")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::ports::mock::MockDeliveryTracker;

    #[tokio::test]
    async fn test_maps_tracker_status() {
        let tracker = Arc::new(MockDeliveryTracker::new());
        tracker.set_status("FAX-1", DeliveryStatus::Failed).await;
        tracker.set_status("FAX-2", DeliveryStatus::Delivered).await;
        let monitor = TransmissionMonitor::new(tracker, Duration::from_millis(100));

        assert_eq!(monitor.check_delivery(&TransmissionRef::new("FAX-1")).await, DeliveryCheck::Failed);
        assert_eq!(monitor.check_delivery(&TransmissionRef::new("FAX-2")).await, DeliveryCheck::Delivered);
        assert_eq!(monitor.check_delivery(&TransmissionRef::new("FAX-3")).await, DeliveryCheck::Pending);
    }

    #[tokio::test]
    async fn test_tracker_error_is_unavailable() {
        let tracker = Arc::new(MockDeliveryTracker::new());
        tracker.set_unavailable(true);
        let monitor = TransmissionMonitor::new(tracker, Duration::from_millis(100));
        assert_eq!(
            monitor.check_delivery(&TransmissionRef::new("FAX-1")).await,
            DeliveryCheck::Unavailable
        );
    }
}
