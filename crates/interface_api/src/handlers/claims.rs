//! Claims handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{ClaimId, Clock};
use domain_claims::ClaimStore;

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Registers a newly detected denial
pub async fn register_claim(
    State(state): State<AppState>,
    Json(request): Json<RegisterClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    request.validate()?;
    let claim = request.into_claim(state.clock.now())?;
    let claim = state.review.register_claim(claim).await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

/// Lists claims, optionally filtered by status
pub async fn list_claims(
    State(state): State<AppState>,
    Query(query): Query<ClaimListQuery>,
) -> Result<Json<Vec<ClaimSummary>>, ApiError> {
    let status = query.status()?;
    let claims = state.claims.list_claims().await?;
    Ok(Json(
        claims
            .iter()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .map(ClaimSummary::from)
            .collect(),
    ))
}

/// Gets a claim by ID, with its audit trail
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.review.get_claim(ClaimId::from_uuid(id)).await?;
    Ok(Json(claim.into()))
}
