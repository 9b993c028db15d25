//! Claims DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, Money};
use domain_claims::{
    AdjudicationOutcome, AuditEntry, Claim, ClaimStatus, DeliveryStatus, Notice, NoticeKind,
    Priority, ReasonCode,
};

use crate::error::ApiError;

/// A newly detected denial
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterClaimRequest {
    #[validate(length(min = 1, message = "payer is required"))]
    pub payer: String,
    #[validate(length(min = 1, message = "procedure is required"))]
    pub procedure: String,
    #[validate(length(min = 1, message = "reason code is required"))]
    pub reason_code: String,
    pub stake_amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    /// "urgent" / "High Priority" or "standard"
    pub priority: String,
    /// Defaults to the time of the request
    #[serde(default)]
    pub detected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub narrative_ref: Option<String>,
}

impl RegisterClaimRequest {
    pub fn into_claim(self, now: DateTime<Utc>) -> Result<Claim, ApiError> {
        if self.stake_amount <= Decimal::ZERO {
            return Err(ApiError::Validation(
                "Request failed validation".to_string(),
                vec!["stake_amount: must be positive".to_string()],
            ));
        }
        let currency: Currency = match self.currency.as_deref() {
            Some(code) => code
                .parse()
                .map_err(|e: core_kernel::MoneyError| ApiError::BadRequest(e.to_string()))?,
            None => Currency::USD,
        };
        let priority: Priority = self.priority.parse()?;

        let mut claim = Claim::new(
            self.payer.trim(),
            self.procedure.trim(),
            ReasonCode::new(self.reason_code.trim()),
            Money::new(self.stake_amount, currency),
            priority,
            self.detected_at.unwrap_or(now),
        );
        claim.narrative_ref = self.narrative_ref;
        Ok(claim)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditEntryResponse {
    pub id: Uuid,
    pub from: ClaimStatus,
    pub to: ClaimStatus,
    pub reason: String,
    pub actor: String,
    pub flags: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<&AuditEntry> for AuditEntryResponse {
    fn from(entry: &AuditEntry) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            from: entry.from,
            to: entry.to,
            reason: entry.reason.clone(),
            actor: entry.actor.to_string(),
            flags: entry.flags.iter().map(|f| f.as_str().to_string()).collect(),
            recorded_at: entry.recorded_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoticeResponse {
    pub kind: NoticeKind,
    pub body: String,
    pub generated_at: DateTime<Utc>,
}

impl From<&Notice> for NoticeResponse {
    fn from(notice: &Notice) -> Self {
        Self {
            kind: notice.kind,
            body: notice.body.clone(),
            generated_at: notice.generated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub payer: String,
    pub procedure: String,
    pub reason_code: String,
    pub stake: Decimal,
    pub currency: String,
    pub priority: String,
    pub status: ClaimStatus,
    pub outcome: AdjudicationOutcome,
    pub recovered_amount: Option<Decimal>,
    pub settled_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub strategy: Option<String>,
    pub draft: Option<String>,
    pub transmission_ref: Option<String>,
    pub delivery: DeliveryStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub notices: Vec<NoticeResponse>,
    pub audit: Vec<AuditEntryResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            id: *claim.id.as_uuid(),
            reason_code: claim.reason_code.as_str().to_string(),
            stake: claim.stake.amount(),
            currency: claim.stake.currency().code().to_string(),
            priority: claim.priority.as_str().to_string(),
            status: claim.status,
            outcome: claim.outcome,
            recovered_amount: claim.recovered_amount.map(|m| m.amount()),
            settled_at: claim.settled_at,
            due_at: claim.due_at,
            strategy: claim.strategy.as_ref().map(|s| s.code().to_string()),
            draft: claim.draft.map(|d| d.text),
            transmission_ref: claim
                .submission
                .transmission_ref
                .map(|r| r.as_str().to_string()),
            delivery: claim.submission.delivery,
            submitted_at: claim.submission.submitted_at,
            notices: claim.notices.iter().map(NoticeResponse::from).collect(),
            audit: claim.audit_log.iter().map(AuditEntryResponse::from).collect(),
            created_at: claim.created_at,
            updated_at: claim.updated_at,
            payer: claim.payer,
            procedure: claim.procedure,
        }
    }
}

/// Claim list entry
#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimSummary {
    pub id: Uuid,
    pub payer: String,
    pub procedure: String,
    pub status: ClaimStatus,
    pub stake: Decimal,
    pub due_at: Option<DateTime<Utc>>,
}

impl From<&Claim> for ClaimSummary {
    fn from(claim: &Claim) -> Self {
        Self {
            id: *claim.id.as_uuid(),
            payer: claim.payer.clone(),
            procedure: claim.procedure.clone(),
            status: claim.status,
            stake: claim.stake.amount(),
            due_at: claim.due_at,
        }
    }
}

/// Optional filter on the claim list
#[derive(Debug, Default, Deserialize)]
pub struct ClaimListQuery {
    #[serde(default)]
    pub status: Option<String>,
}

impl ClaimListQuery {
    pub fn status(&self) -> Result<Option<ClaimStatus>, ApiError> {
        match self.status.as_deref() {
            Some(value) => Ok(Some(value.parse()?)),
            None => Ok(None),
        }
    }
}
