//! PostgreSQL claim store
//!
//! Implements `ClaimStore` with `ClaimsRepository`. Saves are a single
//! transaction covering the claim row and any audit entries not yet stored.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_claims::{Claim, ClaimStore};

use crate::repositories::claims::{AuditRow, ClaimRecord, ClaimRow, ClaimsRepository};

const ADAPTER_ID: &str = "postgres-claim-store";

/// PostgreSQL-backed implementation of the `ClaimStore` port
#[derive(Debug, Clone)]
pub struct PostgresClaimStore {
    repository: ClaimsRepository,
    pool: PgPool,
}

impl PostgresClaimStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn repository(&self) -> &ClaimsRepository {
        &self.repository
    }
}

impl DomainPort for PostgresClaimStore {}

#[async_trait]
impl HealthCheckable for PostgresClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, ADAPTER_ID).await
    }
}

fn to_rows(claim: &Claim) -> (ClaimRow, Vec<AuditRow>) {
    (
        ClaimRow::from(claim),
        claim.audit_log.iter().map(AuditRow::from).collect(),
    )
}

fn to_claims(records: Vec<ClaimRecord>) -> Result<Vec<Claim>, PortError> {
    records
        .into_iter()
        .map(|record| record.into_claim().map_err(PortError::from))
        .collect()
}

#[async_trait]
impl ClaimStore for PostgresClaimStore {
    #[instrument(skip(self))]
    async fn load_open_claims(&self) -> Result<Vec<Claim>, PortError> {
        let records = self.repository.find_open().await?;
        debug!(count = records.len(), "Loaded open claims");
        to_claims(records)
    }

    #[instrument(skip(self))]
    async fn list_claims(&self) -> Result<Vec<Claim>, PortError> {
        to_claims(self.repository.find_all().await?)
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        let record = self.repository.get_by_id(*id.as_uuid()).await?;
        Ok(record.into_claim()?)
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id, status = %claim.status))]
    async fn save_claim(&self, claim: &Claim) -> Result<(), PortError> {
        let (row, audit) = to_rows(claim);
        self.repository.save(&row, &audit).await?;
        debug!(audit_entries = audit.len(), "Saved claim");
        Ok(())
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id))]
    async fn insert_claim(&self, claim: &Claim) -> Result<(), PortError> {
        let (row, audit) = to_rows(claim);
        self.repository.insert(&row, &audit).await?;
        Ok(())
    }
}
