//! Ports and adapters infrastructure
//!
//! The reconciler talks to everything outside its own memory (claim storage,
//! the strategy rules table, payer routes, FHIR adjudication sources, fax
//! delivery tracking) through narrow port traits. Each domain crate declares its
//! own traits on top of the marker types here; adapters in `infra_db` and
//! `domain_reconciliation` provide internal (database) or external (HTTP)
//! implementations.
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait ClaimStore: DomainPort {
//!     async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;
//!     async fn save_claim(&self, claim: &Claim) -> Result<(), PortError>;
//! }
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for port operations
///
/// Every adapter, internal or external, reports failures through this type so
/// that callers can classify them without knowing the backing system.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// Credentials were rejected by an external system
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String },

    /// A response could not be mapped onto domain types
    #[error("Transformation error: {message}")]
    Transformation { message: String },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a Validation error with field information
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Timeout error for an operation bounded by `limit`
    pub fn timeout(operation: impl Into<String>, limit: Duration) -> Self {
        PortError::Timeout {
            operation: operation.into(),
            duration_ms: limit.as_millis() as u64,
        }
    }

    /// Creates a Transformation error
    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits extend this marker so they can be shared as
/// `Arc<dyn Port>` across tasks.
pub trait DomainPort: Send + Sync + 'static {}

/// Type of adapter implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterType {
    /// Internal database adapter
    Internal,
    /// External REST API adapter
    ExternalRestApi,
    /// In-memory adapter
    Mock,
}

/// Circuit breaker configuration for external adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit
    pub failure_threshold: u32,
    /// Seconds the circuit stays open before letting a trial request through
    pub reset_timeout_secs: u64,
    /// Successful calls needed to close the circuit again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_secs: 30,
            success_threshold: 1,
        }
    }
}

/// Configuration shared by external adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Unique identifier for this adapter instance, used as the source label
    pub adapter_id: String,
    pub adapter_type: AdapterType,
    pub enabled: bool,
    /// Base URL of the external system
    pub base_url: Option<String>,
    /// Bearer token sent with every request
    #[serde(skip_serializing)]
    pub bearer_token: Option<String>,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            adapter_id: "default".to_string(),
            adapter_type: AdapterType::Internal,
            enabled: true,
            base_url: None,
            bearer_token: None,
            timeout_ms: 5_000,
            circuit_breaker: None,
        }
    }
}

impl AdapterConfig {
    /// Creates a REST adapter configuration pointing at `base_url`
    pub fn rest(adapter_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            adapter_type: AdapterType::ExternalRestApi,
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = Some(config);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    pub message: Option<String>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    /// A healthy result for adapters with no remote dependency
    pub fn healthy(adapter_id: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: chrono::Utc::now(),
        }
    }
}

/// Trait for adapters that support health checks
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Performs a health check on the adapter
    ///
    /// # Returns
    ///
    /// A `HealthCheckResult` indicating the current health status
    async fn health_check(&self) -> HealthCheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Claim", "CLM-123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("CLM-123"));
    }

    #[test]
    fn test_port_error_transient() {
        let timeout = PortError::timeout("fhir.eob_search", Duration::from_millis(250));
        assert!(timeout.is_transient());
        assert!(timeout.to_string().contains("250ms"));

        assert!(PortError::ServiceUnavailable {
            service: "EPIC".to_string()
        }
        .is_transient());
        assert!(!PortError::validation("missing payer").is_transient());
    }

    #[test]
    fn test_rest_adapter_config() {
        let config = AdapterConfig::rest("EPIC", "https://fhir.example.org/R4")
            .with_token("secret")
            .with_timeout_ms(1500);
        assert_eq!(config.adapter_type, AdapterType::ExternalRestApi);
        assert_eq!(config.timeout(), Duration::from_millis(1500));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
