//! Reconciliation errors

use thiserror::Error;

use core_kernel::{ClaimId, PortError};
use domain_claims::ClaimError;

/// Failure while reconciling a single claim
///
/// None of these stop the batch; each is recorded against its claim.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// No adjudication source answered; nothing changed, retried next batch
    #[error("No adjudication source reachable (tried {attempted:?})")]
    SourceUnavailable { attempted: Vec<String> },

    /// The claim was changed by someone else while the batch held it; the
    /// batch's changes were discarded and the claim is retried next run
    #[error("Claim changed during the batch: {0}")]
    ConcurrentUpdate(#[source] PortError),

    /// A store read or write failed; the claim's changes were discarded
    #[error("Persistence failure: {0}")]
    Persistence(#[source] PortError),

    /// The claim's data violates a lifecycle invariant
    #[error("Invalid claim state: {0}")]
    InvalidClaimState(String),

    /// Draft, complaint or route collaborator failed
    #[error("Collaborator {collaborator} failed: {source}")]
    Collaborator {
        collaborator: &'static str,
        #[source]
        source: PortError,
    },
}

impl From<ClaimError> for ReconcileError {
    fn from(err: ClaimError) -> Self {
        ReconcileError::InvalidClaimState(err.to_string())
    }
}

impl ReconcileError {
    pub fn collaborator(collaborator: &'static str, source: PortError) -> Self {
        ReconcileError::Collaborator {
            collaborator,
            source,
        }
    }
}

/// Failure of a human review action
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Claim not found: {0}")]
    ClaimNotFound(ClaimId),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error("Port error: {0}")]
    Port(#[from] PortError),
}
