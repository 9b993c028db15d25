//! Core Kernel - Foundational types shared by every appeal reconciler crate
//!
//! This crate provides the building blocks used across the domain modules:
//! - Money types with precise decimal arithmetic for claim stakes and recoveries
//! - Strongly-typed identifiers
//! - An injectable clock so deadline math never reads ambient time
//! - Port error and health types for the ports and adapters layout

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{checked_deadline, Clock, SystemClock, FixedClock, TemporalError};
pub use identifiers::{ClaimId, AuditEntryId, EventId};
pub use ports::{
    PortError, DomainPort, AdapterConfig, CircuitBreakerConfig, AdapterType, AdapterHealth,
    HealthCheckable, HealthCheckResult,
};
pub use error::CoreError;
