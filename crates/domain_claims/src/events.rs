//! Outbound lifecycle events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use core_kernel::{ClaimId, EventId, Money};

use crate::claim::Claim;
use crate::routing::PayerRoute;

/// Event kinds consumed by downstream collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Transmission failed, the route must be repaired
    AgenticHeal,
    /// A paper rejection arrived and needs extraction
    OcrRequired,
    /// The payer approved the appeal
    Victory,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AgenticHeal => "AGENTIC_HEAL",
            EventKind::OcrRequired => "OCR_REQUIRED",
            EventKind::Victory => "VICTORY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimEvent {
    pub id: EventId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub claim_id: ClaimId,
    pub payer: String,
    pub detail: serde_json::Value,
    pub emitted_at: DateTime<Utc>,
}

impl ClaimEvent {
    fn new(kind: EventKind, claim: &Claim, detail: serde_json::Value, at: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new_v7(),
            kind,
            claim_id: claim.id,
            payer: claim.payer.clone(),
            detail,
            emitted_at: at,
        }
    }

    /// Heal request carrying the route that failed
    pub fn heal(claim: &Claim, route: &PayerRoute, at: DateTime<Utc>) -> Self {
        let transmission = claim
            .submission
            .transmission_ref
            .as_ref()
            .map(|r| r.as_str().to_string());
        Self::new(
            EventKind::AgenticHeal,
            claim,
            json!({
                "route": route,
                "transmission_ref": transmission,
            }),
            at,
        )
    }

    pub fn ocr_required(claim: &Claim, fax_id: &str, at: DateTime<Utc>) -> Self {
        Self::new(EventKind::OcrRequired, claim, json!({ "fax_id": fax_id }), at)
    }

    pub fn victory(claim: &Claim, recovered: &Money, at: DateTime<Utc>) -> Self {
        Self::new(
            EventKind::Victory,
            claim,
            json!({
                "procedure": claim.procedure,
                "reason_code": claim.reason_code,
                "recovered": recovered.amount().to_string(),
                "currency": recovered.currency().code(),
            }),
            at,
        )
    }
}
