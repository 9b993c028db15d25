//! Appeal lifecycle domain errors

use thiserror::Error;

use core_kernel::{MoneyError, TemporalError};

/// Errors that can occur in the appeal lifecycle domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Invalid claim state: {0}")]
    InvalidClaimState(String),

    #[error("Claim already closed in status {0}")]
    ClaimClosed(String),

    #[error("Unknown claim status: {0}")]
    UnknownStatus(String),

    #[error("Unknown priority: {0}")]
    UnknownPriority(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),
}

impl ClaimError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        ClaimError::InvalidClaimState(message.into())
    }
}
