//! Stale submission follow-up

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;

use crate::claim::{Claim, ClaimStatus};
use crate::letters;

/// Age after which a submitted appeal gets a status inquiry
pub fn default_follow_up_after() -> Duration {
    Duration::days(3)
}

/// A submission that warrants a status inquiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    pub claim_id: ClaimId,
    pub payer: String,
    pub submitted_at: DateTime<Utc>,
    pub days_outstanding: i64,
    pub letter: String,
}

/// Lists `Submitted` claims transmitted more than `after` ago
///
/// Does not change any claim.
pub fn stale_submissions(claims: &[Claim], now: DateTime<Utc>, after: Duration) -> Vec<FollowUp> {
    claims
        .iter()
        .filter(|c| c.status == ClaimStatus::Submitted)
        .filter_map(|c| c.submission.submitted_at.map(|at| (c, at)))
        .filter(|(_, submitted_at)| now - *submitted_at > after)
        .map(|(claim, submitted_at)| FollowUp {
            claim_id: claim.id,
            payer: claim.payer.clone(),
            submitted_at,
            days_outstanding: (now - submitted_at).num_days(),
            letter: letters::status_inquiry(claim, now),
        })
        .collect()
}
