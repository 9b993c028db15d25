//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the appeal lifecycle using SQLx: the claim
//! table with its append-only audit log, the learned strategy rules, and the
//! payer route directory.
//!
//! # Architecture
//!
//! Repositories own the SQL and row types. Adapters implement the
//! `domain_claims` ports on top of them, so the reconciler never sees a
//! database type.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresClaimStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/appeals")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresClaimStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PostgresClaimStore, PostgresPayerRoutes, PostgresStrategyRules};
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR};
pub use repositories::{ClaimsRepository, PayerRoutesRepository, StrategyRulesRepository};
