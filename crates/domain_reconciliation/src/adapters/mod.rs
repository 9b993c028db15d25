//! Adapters for the reconciliation ports
//!
//! - [`FhirAdjudicationSource`]: payer FHIR `ExplanationOfBenefit` search
//! - [`PhaxioDeliveryTracker`]: fax delivery status
//! - [`TemplateDraftGenerator`] / [`TemplateComplaintGenerator`]: letter templates
//! - [`TracingEventSink`] / [`WebhookEventSink`]: event delivery

mod circuit;
pub mod events;
pub mod fax;
pub mod fhir;
pub mod templates;

pub use events::{TracingEventSink, WebhookEventSink};
pub use fax::{PhaxioConfig, PhaxioDeliveryTracker, PHAXIO_BASE_URL};
pub use fhir::FhirAdjudicationSource;
pub use templates::{TemplateComplaintGenerator, TemplateDraftGenerator};
