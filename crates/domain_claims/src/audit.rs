//! Claim audit trail

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AuditEntryId, ClaimId};

use crate::claim::ClaimStatus;

/// Who performed an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Actor {
    /// The batch reconciler
    Reconciler,
    /// A human reviewer, identified by name
    Reviewer(String),
}

impl Actor {
    pub fn reviewer(name: impl Into<String>) -> Self {
        Actor::Reviewer(name.into())
    }

    /// Parses the storage form produced by `Display`
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix("reviewer:") {
            Some(name) => Actor::Reviewer(name.to_string()),
            None => Actor::Reconciler,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Reconciler => f.write_str("reconciler"),
            Actor::Reviewer(name) => write!(f, "reviewer:{name}"),
        }
    }
}

/// Qualifiers attached to an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditFlag {
    /// Recovered amount taken from the stake because the payer reported none
    AssumedFullRecovery,
    /// Decision based on a synthetic adjudication report
    SyntheticSource,
}

impl AuditFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditFlag::AssumedFullRecovery => "assumed full recovery",
            AuditFlag::SyntheticSource => "synthetic source",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "assumed full recovery" => Some(AuditFlag::AssumedFullRecovery),
            "synthetic source" => Some(AuditFlag::SyntheticSource),
            _ => None,
        }
    }
}

/// One entry of the append-only audit log
///
/// `from == to` for review actions that do not change status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub claim_id: ClaimId,
    pub from: ClaimStatus,
    pub to: ClaimStatus,
    pub reason: String,
    pub actor: Actor,
    #[serde(default)]
    pub flags: Vec<AuditFlag>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn is_transition(&self) -> bool {
        self.from != self.to
    }
}
