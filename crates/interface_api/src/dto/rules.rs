//! Strategy rule and payer route DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_claims::{
    AppealStrategy, PayerRoute, ReasonCode, RouteProvenance, RuleProvenance, StrategyRule,
};

/// Operator-entered rule; `payer` may be `*`
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertRuleRequest {
    #[validate(length(min = 1, message = "payer is required"))]
    pub payer: String,
    #[validate(length(min = 1, message = "reason code is required"))]
    pub reason_code: String,
    /// Built-in strategy code, or free playbook text
    #[validate(length(min = 1, message = "strategy is required"))]
    pub strategy: String,
}

impl UpsertRuleRequest {
    pub fn into_rule(self, now: DateTime<Utc>) -> StrategyRule {
        StrategyRule::new(
            self.payer.trim(),
            ReasonCode::new(&self.reason_code),
            AppealStrategy::from(self.strategy),
            RuleProvenance::Manual,
            now,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RuleResponse {
    pub payer: String,
    pub reason_code: String,
    pub strategy: String,
    pub provenance: String,
    pub updated_at: DateTime<Utc>,
}

impl From<StrategyRule> for RuleResponse {
    fn from(rule: StrategyRule) -> Self {
        Self {
            reason_code: rule.reason_code.as_str().to_string(),
            strategy: rule.strategy.code().to_string(),
            provenance: rule.provenance.as_str().to_string(),
            updated_at: rule.updated_at,
            payer: rule.payer,
        }
    }
}

/// Directory entry for a payer
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertRouteRequest {
    #[validate(length(min = 1, message = "payer is required"))]
    pub payer: String,
    #[validate(length(min = 7, message = "fax number is too short"))]
    pub fax: String,
    #[validate(length(min = 1, message = "department is required"))]
    pub department: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl UpsertRouteRequest {
    pub fn into_route(self, now: DateTime<Utc>) -> PayerRoute {
        PayerRoute::new(
            self.payer.trim(),
            self.fax.trim(),
            self.department.trim(),
            RouteProvenance::Directory,
            now,
        )
        .with_aliases(self.aliases)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteResponse {
    pub payer: String,
    pub fax: String,
    pub department: String,
    pub aliases: Vec<String>,
    pub provenance: String,
    pub updated_at: DateTime<Utc>,
}

impl From<PayerRoute> for RouteResponse {
    fn from(route: PayerRoute) -> Self {
        Self {
            provenance: route.provenance.as_str().to_string(),
            payer: route.payer,
            fax: route.fax,
            department: route.department,
            aliases: route.aliases,
            updated_at: route.updated_at,
        }
    }
}

/// Route lookup by payer name as it appears on a denial
#[derive(Debug, Deserialize)]
pub struct ResolveRouteQuery {
    pub payer: String,
}
