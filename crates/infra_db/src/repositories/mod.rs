//! Repository implementations for the appeal tables
//!
//! Each repository owns the SQL for one table family and maps between
//! database rows and plain row structs. Conversion to domain types happens
//! on the row types so the adapters stay thin.

pub mod claims;
pub mod routes;
pub mod rules;

pub use claims::{AuditRow, ClaimRecord, ClaimRow, ClaimsRepository};
pub use routes::{PayerRouteRow, PayerRoutesRepository};
pub use rules::{StrategyRuleRow, StrategyRulesRepository};
