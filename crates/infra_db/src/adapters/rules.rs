//! PostgreSQL strategy rules store

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_claims::{AppealStrategy, ReasonCode, StrategyRule, StrategyRulesStore};

use crate::repositories::rules::{StrategyRuleRow, StrategyRulesRepository};

const ADAPTER_ID: &str = "postgres-strategy-rules";

#[derive(Debug, Clone)]
pub struct PostgresStrategyRules {
    repository: StrategyRulesRepository,
    pool: PgPool,
}

impl PostgresStrategyRules {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: StrategyRulesRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresStrategyRules {}

#[async_trait]
impl HealthCheckable for PostgresStrategyRules {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl StrategyRulesStore for PostgresStrategyRules {
    #[instrument(skip(self), fields(reason_code = %reason_code))]
    async fn lookup(
        &self,
        payer: &str,
        reason_code: &ReasonCode,
    ) -> Result<AppealStrategy, PortError> {
        let found = self
            .repository
            .find_best(payer, reason_code.as_str())
            .await?;
        Ok(found
            .map(|row| StrategyRule::from(row).strategy)
            .unwrap_or_default())
    }

    #[instrument(skip(self, rule), fields(payer = %rule.payer, reason_code = %rule.reason_code))]
    async fn upsert(&self, rule: StrategyRule) -> Result<(), PortError> {
        self.repository.upsert(&StrategyRuleRow::from(&rule)).await?;
        Ok(())
    }

    async fn list_rules(&self) -> Result<Vec<StrategyRule>, PortError> {
        let rows = self.repository.list().await?;
        Ok(rows.into_iter().map(StrategyRule::from).collect())
    }
}
