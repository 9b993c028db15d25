//! Claim Lifecycle Reconciliation
//!
//! The batch engine that keeps every open appeal in step with the outside
//! world. One [`Reconciler::reconcile`] call loads the open claims, checks
//! transmissions, polls payer adjudication, escalates missed deadlines,
//! settles approvals and drafts new appeals, then reports what happened.
//!
//! Human review actions that act on a single claim live in [`review`].
//!
//! # Example
//!
//! ```rust,ignore
//! let poller = AdjudicationPoller::new(vec![primary, secondary], config.poll_timeout());
//! let monitor = TransmissionMonitor::new(fax_tracker, config.delivery_timeout());
//! let reconciler = Reconciler::new(ports, poller, monitor, clock, config);
//!
//! let report = reconciler.reconcile().await?;
//! println!("{} transitions", report.transitions.len());
//! ```

pub mod adapters;
pub mod config;
pub mod error;
pub mod monitor;
pub mod orchestrator;
pub mod poller;
pub mod report;
pub mod review;

pub use config::ReconcilerConfig;
pub use error::{ReconcileError, ReviewError};
pub use monitor::{DeliveryCheck, TransmissionMonitor};
pub use orchestrator::{Reconciler, ReconcilerPorts};
pub use poller::{AdjudicationPoller, PollOutcome};
pub use report::{FailureKind, FailureRecord, ReconcileReport, TransitionRecord};
pub use review::{ReviewService, DEFAULT_OMNIBUS_MIN_CLAIMS};
