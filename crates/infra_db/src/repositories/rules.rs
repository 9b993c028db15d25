//! Strategy rules repository
//!
//! Rules are keyed by the lowercased payer name and the reason code, so a
//! later upsert for "CIGNA" replaces the rule stored for "Cigna".

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use domain_claims::{AppealStrategy, ReasonCode, RuleProvenance, StrategyRule};

use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct StrategyRuleRow {
    pub payer_key: String,
    pub payer: String,
    pub reason_code: String,
    pub strategy: String,
    pub provenance: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&StrategyRule> for StrategyRuleRow {
    fn from(rule: &StrategyRule) -> Self {
        Self {
            payer_key: rule.payer.trim().to_lowercase(),
            payer: rule.payer.clone(),
            reason_code: rule.reason_code.as_str().to_string(),
            strategy: rule.strategy.code().to_string(),
            provenance: rule.provenance.as_str().to_string(),
            updated_at: rule.updated_at,
        }
    }
}

impl From<StrategyRuleRow> for StrategyRule {
    fn from(row: StrategyRuleRow) -> Self {
        StrategyRule::new(
            row.payer,
            ReasonCode::new(row.reason_code),
            AppealStrategy::from(row.strategy),
            RuleProvenance::parse(&row.provenance),
            row.updated_at,
        )
    }
}

/// Repository for learned strategy rules
#[derive(Debug, Clone)]
pub struct StrategyRulesRepository {
    pool: PgPool,
}

impl StrategyRulesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Exact payer rule first, then the wildcard rule
    pub async fn find_best(
        &self,
        payer: &str,
        reason_code: &str,
    ) -> Result<Option<StrategyRuleRow>, DatabaseError> {
        let row = sqlx::query_as::<_, StrategyRuleRow>(
            r#"
            SELECT payer_key, payer, reason_code, strategy, provenance, updated_at
            FROM strategy_rules
            WHERE reason_code = $2 AND payer_key IN (lower(trim($1)), '*')
            ORDER BY (payer_key = '*')
            LIMIT 1
            "#,
        )
        .bind(payer)
        .bind(reason_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn upsert(&self, row: &StrategyRuleRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO strategy_rules (payer_key, payer, reason_code, strategy, provenance, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (payer_key, reason_code) DO UPDATE SET
                payer = EXCLUDED.payer,
                strategy = EXCLUDED.strategy,
                provenance = EXCLUDED.provenance,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&row.payer_key)
        .bind(&row.payer)
        .bind(&row.reason_code)
        .bind(&row.strategy)
        .bind(&row.provenance)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<StrategyRuleRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, StrategyRuleRow>(
            r#"
            SELECT payer_key, payer, reason_code, strategy, provenance, updated_at
            FROM strategy_rules
            ORDER BY payer_key, reason_code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{PayerFixtures, RuleFixtures};

    #[test]
    fn test_payer_key_is_case_folded() {
        let rule = RuleFixtures::rule("  CIGNA ", PayerFixtures::co_197(), AppealStrategy::StepTherapy);
        let row = StrategyRuleRow::from(&rule);
        assert_eq!(row.payer_key, "cigna");
        assert_eq!(row.strategy, "STEP_THERAPY");
    }

    #[test]
    fn test_custom_playbook_survives_storage() {
        let rule = RuleFixtures::rule(
            "Aetna",
            PayerFixtures::co_50(),
            AppealStrategy::Custom("Cite the surgeon's peer-reviewed outcomes".to_string()),
        );
        let restored = StrategyRule::from(StrategyRuleRow::from(&rule));
        assert_eq!(restored.strategy, rule.strategy);
        assert_eq!(restored.provenance, rule.provenance);
    }
}
