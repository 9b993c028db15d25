//! Payer routes repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use domain_claims::{PayerRoute, RouteProvenance};

use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct PayerRouteRow {
    pub payer_key: String,
    pub payer: String,
    pub fax: String,
    pub department: String,
    pub aliases: Vec<String>,
    pub provenance: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&PayerRoute> for PayerRouteRow {
    fn from(route: &PayerRoute) -> Self {
        Self {
            payer_key: route.payer.trim().to_lowercase(),
            payer: route.payer.clone(),
            fax: route.fax.clone(),
            department: route.department.clone(),
            aliases: route.aliases.clone(),
            provenance: route.provenance.as_str().to_string(),
            updated_at: route.updated_at,
        }
    }
}

impl From<PayerRouteRow> for PayerRoute {
    fn from(row: PayerRouteRow) -> Self {
        PayerRoute::new(
            row.payer,
            row.fax,
            row.department,
            RouteProvenance::parse(&row.provenance),
            row.updated_at,
        )
        .with_aliases(row.aliases)
    }
}

/// Repository for the payer transmission directory
#[derive(Debug, Clone)]
pub struct PayerRoutesRepository {
    pool: PgPool,
}

impl PayerRoutesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<PayerRouteRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PayerRouteRow>(
            r#"
            SELECT payer_key, payer, fax, department, aliases, provenance, updated_at
            FROM payer_routes
            ORDER BY payer_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert(&self, row: &PayerRouteRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payer_routes (payer_key, payer, fax, department, aliases, provenance, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (payer_key) DO UPDATE SET
                payer = EXCLUDED.payer,
                fax = EXCLUDED.fax,
                department = EXCLUDED.department,
                aliases = EXCLUDED.aliases,
                provenance = EXCLUDED.provenance,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&row.payer_key)
        .bind(&row.payer)
        .bind(&row.fax)
        .bind(&row.department)
        .bind(&row.aliases)
        .bind(&row.provenance)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::RouteFixtures;

    #[test]
    fn test_aliases_kept_through_row() {
        let route = RouteFixtures::aetna().with_aliases(["Aetna Better Health"]);
        let row = PayerRouteRow::from(&route);
        assert_eq!(row.payer_key, "aetna");

        let restored = PayerRoute::from(row);
        assert_eq!(restored, route);
    }
}
