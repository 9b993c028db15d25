//! Systemic denial pattern detection

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, Money};

use crate::claim::{Claim, ClaimStatus};
use crate::error::ClaimError;
use crate::letters;

/// A group of unsettled denials sharing payer and procedure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmnibusGroup {
    pub payer: String,
    pub procedure: String,
    pub claim_ids: Vec<ClaimId>,
    pub total_stake: Money,
    pub notice: String,
}

/// Groups non-settled claims by (payer, procedure) and keeps groups with at
/// least `min_claims` members
///
/// Grouping ignores case and surrounding whitespace. Groups are returned in
/// descending order of size.
pub fn detect_patterns(
    claims: &[Claim],
    min_claims: usize,
    today: DateTime<Utc>,
) -> Result<Vec<OmnibusGroup>, ClaimError> {
    let mut buckets: BTreeMap<(String, String), Vec<&Claim>> = BTreeMap::new();
    for claim in claims.iter().filter(|c| c.status != ClaimStatus::Settled) {
        let key = (
            claim.payer.trim().to_lowercase(),
            claim.procedure.trim().to_lowercase(),
        );
        buckets.entry(key).or_default().push(claim);
    }

    let mut groups = Vec::new();
    for members in buckets.into_values() {
        if members.len() < min_claims.max(1) {
            continue;
        }
        let first = members[0];
        let total = Money::try_sum(first.stake.currency(), members.iter().map(|c| &c.stake))?;
        groups.push(OmnibusGroup {
            payer: first.payer.clone(),
            procedure: first.procedure.clone(),
            claim_ids: members.iter().map(|c| c.id).collect(),
            notice: letters::omnibus_notice(&first.payer, &first.procedure, &members, &total, today),
            total_stake: total,
        });
    }
    groups.sort_by(|a, b| b.claim_ids.len().cmp(&a.claim_ids.len()));
    Ok(groups)
}
