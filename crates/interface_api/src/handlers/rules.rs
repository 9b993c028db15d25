//! Strategy rule and payer route handlers

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use core_kernel::Clock;
use domain_claims::{PayerRouteStore, StrategyRulesStore};

use crate::dto::rules::*;
use crate::{error::ApiError, AppState};

pub async fn list_rules(State(state): State<AppState>) -> Result<Json<Vec<RuleResponse>>, ApiError> {
    let rules = state.rules.list_rules().await?;
    Ok(Json(rules.into_iter().map(RuleResponse::from).collect()))
}

/// Creates or replaces the rule for (payer, reason code)
pub async fn upsert_rule(
    State(state): State<AppState>,
    Json(request): Json<UpsertRuleRequest>,
) -> Result<Json<RuleResponse>, ApiError> {
    request.validate()?;
    let rule = request.into_rule(state.clock.now());
    state.rules.upsert(rule.clone()).await?;
    Ok(Json(rule.into()))
}

pub async fn list_routes(
    State(state): State<AppState>,
) -> Result<Json<Vec<RouteResponse>>, ApiError> {
    let routes = state.routes.list_routes().await?;
    Ok(Json(routes.into_iter().map(RouteResponse::from).collect()))
}

/// Creates or replaces a payer directory entry
pub async fn upsert_route(
    State(state): State<AppState>,
    Json(request): Json<UpsertRouteRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    request.validate()?;
    let route = request.into_route(state.clock.now());
    state.routes.upsert_route(route.clone()).await?;
    Ok(Json(route.into()))
}

/// Shows which route a payer name resolves to
pub async fn resolve_route(
    State(state): State<AppState>,
    Query(query): Query<ResolveRouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    let route = state.routes.resolve(&query.payer).await?;
    Ok(Json(route.into()))
}
