//! Human review action DTOs

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_claims::{FollowUp, OmnibusGroup};

#[derive(Debug, Deserialize, Validate)]
pub struct SaveDraftRequest {
    #[validate(length(min = 1, message = "draft text is required"))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MarkTransmittedRequest {
    #[validate(length(min = 1, message = "transmission reference is required"))]
    pub transmission_ref: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResolveRouteRequest {
    #[validate(length(min = 7, message = "fax number is too short"))]
    pub fax: String,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InboundFaxRequest {
    #[validate(length(min = 1, message = "fax id is required"))]
    pub fax_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OcrExtractionRequest {
    /// Use `UNKNOWN` when the code could not be read
    pub reason_code: String,
    #[validate(length(min = 1, message = "denial text is required"))]
    pub denial_text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteRefinementRequest {
    #[validate(length(min = 1, message = "narrative reference is required"))]
    pub narrative_ref: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LearnFromEditRequest {
    #[validate(length(min = 1, message = "edited text is required"))]
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OmnibusQuery {
    #[serde(default)]
    pub min_claims: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OmnibusGroupResponse {
    pub payer: String,
    pub procedure: String,
    pub claim_ids: Vec<Uuid>,
    pub claim_count: usize,
    pub total_stake: Decimal,
    pub currency: String,
    pub notice: String,
}

impl From<OmnibusGroup> for OmnibusGroupResponse {
    fn from(group: OmnibusGroup) -> Self {
        Self {
            claim_count: group.claim_ids.len(),
            claim_ids: group.claim_ids.iter().map(|id| *id.as_uuid()).collect(),
            total_stake: group.total_stake.amount(),
            currency: group.total_stake.currency().code().to_string(),
            payer: group.payer,
            procedure: group.procedure,
            notice: group.notice,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FollowUpQuery {
    /// Days since transmission; 3 when absent
    #[serde(default)]
    pub after_days: Option<i64>,
}

impl FollowUpQuery {
    pub fn after(&self) -> Option<Duration> {
        self.after_days.map(Duration::days)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowUpResponse {
    pub claim_id: Uuid,
    pub payer: String,
    pub submitted_at: DateTime<Utc>,
    pub days_outstanding: i64,
    pub letter: String,
}

impl From<FollowUp> for FollowUpResponse {
    fn from(follow_up: FollowUp) -> Self {
        Self {
            claim_id: *follow_up.claim_id.as_uuid(),
            payer: follow_up.payer,
            submitted_at: follow_up.submitted_at,
            days_outstanding: follow_up.days_outstanding,
            letter: follow_up.letter,
        }
    }
}
