//! Application configuration
//!
//! Loaded from `APPEALS_*` environment variables after `.env` is read.
//! Nested sections use `__`, for example `APPEALS_RECONCILER__CONCURRENCY=4`
//! or `APPEALS_FHIR__PRIMARY__BASE_URL=https://fhir.availity.example/r4`.

use serde::Deserialize;

use core_kernel::{AdapterConfig, CircuitBreakerConfig};
use domain_claims::routing::DEFAULT_FAX;
use domain_reconciliation::adapters::PhaxioConfig;
use domain_reconciliation::{ReconcilerConfig, DEFAULT_OMNIBUS_MIN_CLAIMS};

/// Where claims, rules and routes are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    /// Process-local stores, lost on restart
    Memory,
}

/// One FHIR claim-status vendor
#[derive(Debug, Clone, Deserialize)]
pub struct FhirSourceConfig {
    /// Label recorded as the report source
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_source_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_source_timeout_ms() -> u64 {
    5_000
}

impl FhirSourceConfig {
    pub fn adapter_config(&self) -> AdapterConfig {
        let mut config = AdapterConfig::rest(&self.name, &self.base_url)
            .with_timeout_ms(self.timeout_ms)
            .with_circuit_breaker(CircuitBreakerConfig::default());
        if let Some(token) = &self.token {
            config = config.with_token(token);
        }
        config
    }
}

/// Adjudication sources, queried primary first
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FhirSourcesConfig {
    #[serde(default)]
    pub primary: Option<FhirSourceConfig>,
    #[serde(default)]
    pub secondary: Option<FhirSourceConfig>,
}

impl FhirSourcesConfig {
    pub fn ordered(&self) -> impl Iterator<Item = &FhirSourceConfig> {
        self.primary.iter().chain(self.secondary.iter())
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL, used by the postgres backend
    pub database_url: String,
    /// Log level when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    pub store: StoreBackend,
    /// Fax used when no payer route matches
    pub default_fax: String,
    /// Smallest group reported by the omnibus query
    pub omnibus_min_claims: usize,
    pub fhir: FhirSourcesConfig,
    /// Fax status API; without it every transmission stays pending
    pub fax: Option<PhaxioConfig>,
    /// Collaborator endpoint receiving lifecycle events as JSON
    pub events_webhook_url: Option<String>,
    pub reconciler: ReconcilerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/appeals".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            store: StoreBackend::Postgres,
            default_fax: DEFAULT_FAX.to_string(),
            omnibus_min_claims: DEFAULT_OMNIBUS_MIN_CLAIMS,
            fhir: FhirSourcesConfig::default(),
            fax: None,
            events_webhook_url: None,
            reconciler: ReconcilerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and then the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Loads configuration from `APPEALS_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("APPEALS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.store, StoreBackend::Postgres);
        assert_eq!(config.default_fax, DEFAULT_FAX);
        assert_eq!(config.fhir.ordered().count(), 0);
    }

    #[test]
    fn test_sources_keep_primary_first() {
        let sources = FhirSourcesConfig {
            primary: Some(FhirSourceConfig {
                name: "availity".to_string(),
                base_url: "https://fhir.availity.example/r4".to_string(),
                token: Some("secret".to_string()),
                timeout_ms: 2_000,
            }),
            secondary: Some(FhirSourceConfig {
                name: "change-healthcare".to_string(),
                base_url: "https://fhir.changehealthcare.example/r4".to_string(),
                token: None,
                timeout_ms: 2_000,
            }),
        };
        let names: Vec<&str> = sources.ordered().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["availity", "change-healthcare"]);

        let adapter = sources.primary.as_ref().map(FhirSourceConfig::adapter_config);
        let adapter = adapter.unwrap();
        assert_eq!(adapter.adapter_id, "availity");
        assert_eq!(adapter.bearer_token.as_deref(), Some("secret"));
        assert!(adapter.circuit_breaker.is_some());
    }

    #[test]
    fn test_store_backend_names() {
        let backend: StoreBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(backend, StoreBackend::Memory);
    }
}
