//! Human review action handlers
//!
//! Every action is attributed to the reviewer named in the `x-reviewer`
//! header and returns the updated claim.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::ClaimId;
use domain_claims::{Actor, ReasonCode, TransmissionRef};

use crate::dto::claims::ClaimResponse;
use crate::dto::review::*;
use crate::dto::rules::RuleResponse;
use crate::{error::ApiError, AppState};

type ClaimResult = Result<Json<ClaimResponse>, ApiError>;

pub async fn save_draft(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveDraftRequest>,
) -> ClaimResult {
    request.validate()?;
    let claim = state
        .review
        .save_draft(ClaimId::from_uuid(id), request.text, actor)
        .await?;
    Ok(Json(claim.into()))
}

pub async fn mark_transmitted(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<MarkTransmittedRequest>,
) -> ClaimResult {
    request.validate()?;
    let claim = state
        .review
        .mark_transmitted(
            ClaimId::from_uuid(id),
            TransmissionRef::new(request.transmission_ref.trim()),
            actor,
        )
        .await?;
    Ok(Json(claim.into()))
}

/// Completes self-healing with a corrected fax route
pub async fn resolve_route(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveRouteRequest>,
) -> ClaimResult {
    request.validate()?;
    let claim = state
        .review
        .resolve_route(ClaimId::from_uuid(id), request.fax, request.department, actor)
        .await?;
    Ok(Json(claim.into()))
}

pub async fn record_inbound_fax(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<InboundFaxRequest>,
) -> ClaimResult {
    request.validate()?;
    let claim = state
        .review
        .record_inbound_fax(ClaimId::from_uuid(id), request.fax_id, actor)
        .await?;
    Ok(Json(claim.into()))
}

pub async fn record_ocr_extraction(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<OcrExtractionRequest>,
) -> ClaimResult {
    request.validate()?;
    let claim = state
        .review
        .record_ocr_extraction(
            ClaimId::from_uuid(id),
            ReasonCode::new(&request.reason_code),
            request.denial_text,
            actor,
        )
        .await?;
    Ok(Json(claim.into()))
}

pub async fn complete_refinement(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteRefinementRequest>,
) -> ClaimResult {
    request.validate()?;
    let claim = state
        .review
        .complete_refinement(ClaimId::from_uuid(id), request.narrative_ref, actor)
        .await?;
    Ok(Json(claim.into()))
}

pub async fn open_discovery(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ClaimResult {
    let claim = state
        .review
        .open_discovery(ClaimId::from_uuid(id), actor)
        .await?;
    Ok(Json(claim.into()))
}

pub async fn escalate_to_cms(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ClaimResult {
    let claim = state
        .review
        .escalate_to_cms(ClaimId::from_uuid(id), actor)
        .await?;
    Ok(Json(claim.into()))
}

/// Turns a physician's edited appeal into a strategy rule
pub async fn learn_from_edit(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<LearnFromEditRequest>,
) -> Result<Json<RuleResponse>, ApiError> {
    request.validate()?;
    let rule = state
        .review
        .learn_from_edit(ClaimId::from_uuid(id), request.text, actor)
        .await?;
    Ok(Json(rule.into()))
}

/// Systemic denial patterns
pub async fn omnibus(
    State(state): State<AppState>,
    Query(query): Query<OmnibusQuery>,
) -> Result<Json<Vec<OmnibusGroupResponse>>, ApiError> {
    let min_claims = query.min_claims.unwrap_or(state.omnibus_min_claims);
    let groups = state.review.omnibus_patterns(min_claims).await?;
    Ok(Json(groups.into_iter().map(OmnibusGroupResponse::from).collect()))
}

/// Submissions due a status inquiry
pub async fn follow_ups(
    State(state): State<AppState>,
    Query(query): Query<FollowUpQuery>,
) -> Result<Json<Vec<FollowUpResponse>>, ApiError> {
    let follow_ups = state.review.follow_ups(query.after()).await?;
    Ok(Json(follow_ups.into_iter().map(FollowUpResponse::from).collect()))
}
