//! Claims repository implementation
//!
//! Database access for appeal claims and their audit log. A claim is stored
//! as one `appeal_claims` row; its draft and notices live in JSONB columns and
//! its audit history in the append-only `claim_audit_log` table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use core_kernel::{AuditEntryId, ClaimId, Currency, Money};
use domain_claims::{
    Actor, AdjudicationOutcome, AppealDraft, AppealStrategy, AppealTier, AuditEntry, AuditFlag, Claim,
    ClaimStatus, DeliveryStatus, Notice, Priority, ReasonCode, Submission, TransmissionRef,
};

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = r#"
    claim_id, payer, procedure, reason_code, stake_amount, currency, priority,
    status, outcome, recovered_amount, settled_at, due_at, strategy,
    narrative_ref, denial_text, transmission_ref, delivery_status,
    submitted_at, inbound_fax_id, draft, appeal_tier, notices, created_at,
    updated_at, version
"#;

/// One row of `appeal_claims`
#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub claim_id: Uuid,
    pub payer: String,
    pub procedure: String,
    pub reason_code: String,
    pub stake_amount: Decimal,
    pub currency: String,
    pub priority: String,
    pub status: String,
    pub outcome: String,
    pub recovered_amount: Option<Decimal>,
    pub settled_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub strategy: Option<String>,
    pub narrative_ref: Option<String>,
    pub denial_text: Option<String>,
    pub transmission_ref: Option<String>,
    pub delivery_status: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub inbound_fax_id: Option<String>,
    pub draft: Option<Json<AppealDraft>>,
    pub appeal_tier: i16,
    pub notices: Json<Vec<Notice>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// One row of `claim_audit_log`
#[derive(Debug, Clone, FromRow)]
pub struct AuditRow {
    pub audit_id: Uuid,
    pub claim_id: Uuid,
    pub from_status: String,
    pub to_status: String,
    pub reason: String,
    pub actor: String,
    pub flags: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

/// A claim row together with its audit history
#[derive(Debug, Clone)]
pub struct ClaimRecord {
    pub row: ClaimRow,
    pub audit: Vec<AuditRow>,
}

impl From<&Claim> for ClaimRow {
    fn from(claim: &Claim) -> Self {
        Self {
            claim_id: *claim.id.as_uuid(),
            payer: claim.payer.clone(),
            procedure: claim.procedure.clone(),
            reason_code: claim.reason_code.as_str().to_string(),
            stake_amount: claim.stake.amount(),
            currency: claim.stake.currency().code().to_string(),
            priority: claim.priority.as_str().to_string(),
            status: claim.status.as_str().to_string(),
            outcome: claim.outcome.as_str().to_string(),
            recovered_amount: claim.recovered_amount.map(|m| m.amount()),
            settled_at: claim.settled_at,
            due_at: claim.due_at,
            strategy: claim.strategy.as_ref().map(|s| s.code().to_string()),
            narrative_ref: claim.narrative_ref.clone(),
            denial_text: claim.denial_text.clone(),
            transmission_ref: claim
                .submission
                .transmission_ref
                .as_ref()
                .map(|r| r.as_str().to_string()),
            delivery_status: claim.submission.delivery.as_str().to_string(),
            submitted_at: claim.submission.submitted_at,
            inbound_fax_id: claim.submission.inbound_fax_id.clone(),
            draft: claim.draft.clone().map(Json),
            appeal_tier: i16::from(claim.tier.number()),
            notices: Json(claim.notices.clone()),
            created_at: claim.created_at,
            updated_at: claim.updated_at,
            version: claim.version,
        }
    }
}

impl From<&AuditEntry> for AuditRow {
    fn from(entry: &AuditEntry) -> Self {
        Self {
            audit_id: *entry.id.as_uuid(),
            claim_id: *entry.claim_id.as_uuid(),
            from_status: entry.from.as_str().to_string(),
            to_status: entry.to.as_str().to_string(),
            reason: entry.reason.clone(),
            actor: entry.actor.to_string(),
            flags: entry.flags.iter().map(|f| f.as_str().to_string()).collect(),
            recorded_at: entry.recorded_at,
        }
    }
}

impl AuditRow {
    fn into_entry(self) -> Result<AuditEntry, DatabaseError> {
        Ok(AuditEntry {
            id: AuditEntryId::from_uuid(self.audit_id),
            claim_id: ClaimId::from_uuid(self.claim_id),
            from: parse_status(&self.from_status)?,
            to: parse_status(&self.to_status)?,
            reason: self.reason,
            actor: Actor::parse(&self.actor),
            flags: self.flags.iter().filter_map(|f| AuditFlag::parse(f)).collect(),
            recorded_at: self.recorded_at,
        })
    }
}

fn parse_status(value: &str) -> Result<ClaimStatus, DatabaseError> {
    value
        .parse()
        .map_err(|e| DatabaseError::mapping("status", e))
}

impl ClaimRecord {
    /// Rebuilds the domain aggregate
    pub fn into_claim(self) -> Result<Claim, DatabaseError> {
        let row = self.row;
        let currency: Currency = row
            .currency
            .trim()
            .parse()
            .map_err(|e| DatabaseError::mapping("currency", e))?;
        let priority: Priority = row
            .priority
            .parse()
            .map_err(|e| DatabaseError::mapping("priority", e))?;
        let outcome: AdjudicationOutcome = row
            .outcome
            .parse()
            .map_err(|e| DatabaseError::mapping("outcome", e))?;
        let delivery: DeliveryStatus = row
            .delivery_status
            .parse()
            .map_err(|e| DatabaseError::mapping("delivery_status", e))?;

        let audit_log = self
            .audit
            .into_iter()
            .map(AuditRow::into_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Claim {
            id: ClaimId::from_uuid(row.claim_id),
            payer: row.payer,
            procedure: row.procedure,
            reason_code: ReasonCode::new(row.reason_code),
            stake: Money::new(row.stake_amount, currency),
            priority,
            status: parse_status(&row.status)?,
            submission: Submission {
                transmission_ref: row.transmission_ref.map(TransmissionRef::new),
                delivery,
                submitted_at: row.submitted_at,
                inbound_fax_id: row.inbound_fax_id,
            },
            outcome,
            recovered_amount: row.recovered_amount.map(|a| Money::new(a, currency)),
            settled_at: row.settled_at,
            due_at: row.due_at,
            strategy: row.strategy.map(AppealStrategy::from),
            narrative_ref: row.narrative_ref,
            denial_text: row.denial_text,
            draft: row.draft.map(|Json(draft)| draft),
            tier: AppealTier::from_number(row.appeal_tier),
            notices: row.notices.0,
            audit_log,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        })
    }
}

/// Repository for appeal claims
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Claims not yet in a terminal status, oldest first
    pub async fn find_open(&self) -> Result<Vec<ClaimRecord>, DatabaseError> {
        let terminal: Vec<String> = ClaimStatus::ALL
            .iter()
            .filter(|s| s.is_terminal())
            .map(|s| s.as_str().to_string())
            .collect();
        let rows = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM appeal_claims \
             WHERE status <> ALL($1) ORDER BY created_at, claim_id"
        ))
        .bind(&terminal)
        .fetch_all(&self.pool)
        .await?;
        self.attach_audit(rows).await
    }

    pub async fn find_all(&self) -> Result<Vec<ClaimRecord>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM appeal_claims ORDER BY created_at, claim_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        self.attach_audit(rows).await
    }

    pub async fn get_by_id(&self, claim_id: Uuid) -> Result<ClaimRecord, DatabaseError> {
        let row = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM appeal_claims WHERE claim_id = $1"
        ))
        .bind(claim_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))?;

        let mut records = self.attach_audit(vec![row]).await?;
        records
            .pop()
            .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))
    }

    /// Inserts a new claim and its initial audit entries
    pub async fn insert(&self, row: &ClaimRow, audit: &[AuditRow]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO appeal_claims (
                claim_id, payer, procedure, reason_code, stake_amount, currency, priority,
                status, outcome, recovered_amount, settled_at, due_at, strategy,
                narrative_ref, denial_text, transmission_ref, delivery_status,
                submitted_at, inbound_fax_id, draft, appeal_tier, notices, created_at,
                updated_at, version
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25
            )
            "#,
        )
        .bind(row.claim_id)
        .bind(&row.payer)
        .bind(&row.procedure)
        .bind(&row.reason_code)
        .bind(row.stake_amount)
        .bind(&row.currency)
        .bind(&row.priority)
        .bind(&row.status)
        .bind(&row.outcome)
        .bind(row.recovered_amount)
        .bind(row.settled_at)
        .bind(row.due_at)
        .bind(&row.strategy)
        .bind(&row.narrative_ref)
        .bind(&row.denial_text)
        .bind(&row.transmission_ref)
        .bind(&row.delivery_status)
        .bind(row.submitted_at)
        .bind(&row.inbound_fax_id)
        .bind(&row.draft)
        .bind(row.appeal_tier)
        .bind(&row.notices)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.version)
        .execute(&mut *tx)
        .await?;

        append_audit(&mut tx, audit).await?;
        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    /// Updates the claim row and appends audit entries not yet stored, atomically
    ///
    /// Only applies when the stored row is still at `row.version`; the
    /// version is then advanced by one. A row changed since it was loaded
    /// gives `DatabaseError::StaleWrite` and nothing is written.
    pub async fn save(&self, row: &ClaimRow, audit: &[AuditRow]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE appeal_claims SET
                payer = $2, procedure = $3, reason_code = $4, stake_amount = $5,
                currency = $6, priority = $7, status = $8, outcome = $9,
                recovered_amount = $10, settled_at = $11, due_at = $12, strategy = $13,
                narrative_ref = $14, denial_text = $15, transmission_ref = $16,
                delivery_status = $17, submitted_at = $18, inbound_fax_id = $19,
                draft = $20, notices = $21, updated_at = $22, appeal_tier = $23,
                version = version + 1
            WHERE claim_id = $1 AND version = $24
            "#,
        )
        .bind(row.claim_id)
        .bind(&row.payer)
        .bind(&row.procedure)
        .bind(&row.reason_code)
        .bind(row.stake_amount)
        .bind(&row.currency)
        .bind(&row.priority)
        .bind(&row.status)
        .bind(&row.outcome)
        .bind(row.recovered_amount)
        .bind(row.settled_at)
        .bind(row.due_at)
        .bind(&row.strategy)
        .bind(&row.narrative_ref)
        .bind(&row.denial_text)
        .bind(&row.transmission_ref)
        .bind(&row.delivery_status)
        .bind(row.submitted_at)
        .bind(&row.inbound_fax_id)
        .bind(&row.draft)
        .bind(&row.notices)
        .bind(row.updated_at)
        .bind(row.appeal_tier)
        .bind(row.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM appeal_claims WHERE claim_id = $1)")
                    .bind(row.claim_id)
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(if exists {
                DatabaseError::StaleWrite(format!(
                    "claim {} is no longer at version {}",
                    row.claim_id, row.version
                ))
            } else {
                DatabaseError::not_found("Claim", row.claim_id)
            });
        }

        append_audit(&mut tx, audit).await?;
        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    async fn attach_audit(&self, rows: Vec<ClaimRow>) -> Result<Vec<ClaimRecord>, DatabaseError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.claim_id).collect();
        let audit_rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT audit_id, claim_id, from_status, to_status, reason, actor, flags, recorded_at
            FROM claim_audit_log
            WHERE claim_id = ANY($1)
            ORDER BY recorded_at, audit_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_claim: HashMap<Uuid, Vec<AuditRow>> = HashMap::new();
        for audit in audit_rows {
            by_claim.entry(audit.claim_id).or_default().push(audit);
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                let audit = by_claim.remove(&row.claim_id).unwrap_or_default();
                ClaimRecord { row, audit }
            })
            .collect())
    }
}

/// Entries already stored are skipped, so saving a claim twice never duplicates history
async fn append_audit(
    tx: &mut Transaction<'_, Postgres>,
    audit: &[AuditRow],
) -> Result<(), DatabaseError> {
    for entry in audit {
        sqlx::query(
            r#"
            INSERT INTO claim_audit_log (
                audit_id, claim_id, from_status, to_status, reason, actor, flags, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (audit_id) DO NOTHING
            "#,
        )
        .bind(entry.audit_id)
        .bind(entry.claim_id)
        .bind(&entry.from_status)
        .bind(&entry.to_status)
        .bind(&entry.reason)
        .bind(&entry.actor)
        .bind(&entry.flags)
        .bind(entry.recorded_at)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{TemporalFixtures, TestClaimBuilder};

    #[test]
    fn test_claim_row_round_trip() {
        let mut claim = TestClaimBuilder::submitted().build();
        claim
            .transition(
                ClaimStatus::EscalatedL1,
                "regulatory window elapsed",
                Actor::Reconciler,
                TemporalFixtures::after_urgent_window(),
            )
            .unwrap();

        let record = ClaimRecord {
            row: ClaimRow::from(&claim),
            audit: claim.audit_log.iter().map(AuditRow::from).collect(),
        };
        let restored = record.into_claim().unwrap();

        assert_eq!(restored.id, claim.id);
        assert_eq!(restored.status, ClaimStatus::EscalatedL1);
        assert_eq!(restored.stake, claim.stake);
        assert_eq!(restored.priority, claim.priority);
        assert_eq!(restored.due_at, claim.due_at);
        assert_eq!(restored.audit_log.len(), 1);
        assert_eq!(restored.audit_log[0].from, ClaimStatus::Submitted);
        assert_eq!(
            restored.draft.map(|d| d.text),
            claim.draft.map(|d| d.text)
        );
    }

    #[test]
    fn test_tier_and_version_survive_storage() {
        let mut claim = TestClaimBuilder::submitted()
            .with_status(ClaimStatus::SubmittedL2)
            .build();
        claim.version = 4;
        claim
            .transition(
                ClaimStatus::HealingRequired,
                "transmission failed",
                Actor::Reconciler,
                TemporalFixtures::after_urgent_window(),
            )
            .unwrap();

        let row = ClaimRow::from(&claim);
        assert_eq!(row.appeal_tier, 2);
        assert_eq!(row.version, 4);

        let restored = ClaimRecord { row, audit: vec![] }.into_claim().unwrap();
        assert_eq!(restored.tier, AppealTier::Level2);
        assert_eq!(restored.drafted_status(), ClaimStatus::DraftedL2);
        assert_eq!(restored.version, 4);
    }

    #[test]
    fn test_unknown_status_is_mapping_error() {
        let claim = TestClaimBuilder::new().build();
        let mut row = ClaimRow::from(&claim);
        row.status = "ARCHIVED".to_string();
        let err = ClaimRecord { row, audit: vec![] }.into_claim().unwrap_err();
        assert!(matches!(err, DatabaseError::Mapping(_)));
    }

    proptest::proptest! {
        #[test]
        fn prop_new_claims_survive_storage(claim in test_utils::new_claim_strategy()) {
            let restored = ClaimRecord { row: ClaimRow::from(&claim), audit: vec![] }
                .into_claim()
                .unwrap();
            proptest::prop_assert_eq!(restored.stake, claim.stake);
            proptest::prop_assert_eq!(restored.priority, claim.priority);
            proptest::prop_assert_eq!(restored.reason_code, claim.reason_code);
            proptest::prop_assert_eq!(restored.payer, claim.payer);
        }
    }
}
