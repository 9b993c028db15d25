//! Batch report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;
use domain_claims::ClaimStatus;

use crate::error::ReconcileError;

/// One status change applied during the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub claim_id: ClaimId,
    pub from: ClaimStatus,
    pub to: ClaimStatus,
    pub reason: String,
}

/// Classification of a per-claim failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SourceUnavailable,
    ConcurrentUpdate,
    Persistence,
    InvalidClaimState,
    Collaborator,
}

impl From<&ReconcileError> for FailureKind {
    fn from(err: &ReconcileError) -> Self {
        match err {
            ReconcileError::SourceUnavailable { .. } => FailureKind::SourceUnavailable,
            ReconcileError::ConcurrentUpdate(_) => FailureKind::ConcurrentUpdate,
            ReconcileError::Persistence(_) => FailureKind::Persistence,
            ReconcileError::InvalidClaimState(_) => FailureKind::InvalidClaimState,
            ReconcileError::Collaborator { .. } => FailureKind::Collaborator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub claim_id: ClaimId,
    pub kind: FailureKind,
    pub message: String,
}

impl FailureRecord {
    pub fn new(claim_id: ClaimId, err: &ReconcileError) -> Self {
        Self {
            claim_id,
            kind: FailureKind::from(err),
            message: err.to_string(),
        }
    }
}

/// Outcome of one `reconcile()` run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Claims attempted in this batch
    pub processed: usize,
    pub transitions: Vec<TransitionRecord>,
    pub failures: Vec<FailureRecord>,
    /// Claims not started before the batch deadline
    pub deferred: Vec<ClaimId>,
    /// Instant every claim in the batch was evaluated against
    pub as_of: Option<DateTime<Utc>>,
    pub elapsed_ms: u64,
}

impl ReconcileReport {
    pub fn transitions_for(&self, claim_id: ClaimId) -> impl Iterator<Item = &TransitionRecord> {
        self.transitions.iter().filter(move |t| t.claim_id == claim_id)
    }

    pub fn failure_for(&self, claim_id: ClaimId) -> Option<&FailureRecord> {
        self.failures.iter().find(|f| f.claim_id == claim_id)
    }
}
