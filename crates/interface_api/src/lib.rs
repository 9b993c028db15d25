//! HTTP API Layer
//!
//! This crate exposes the appeal reconciler over HTTP using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: batch trigger, strategy rules, payer routes, claims and
//!   human review actions
//! - **Middleware**: reviewer identification and request audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent JSON error responses
//! - **State**: stores and services wired from [`config::AppConfig`]
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, config::AppConfig};
//!
//! let state = AppState::from_config(&AppConfig::load()?).await?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod telemetry;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{claims, health, reconcile, review, rules};
use crate::middleware::{audit_middleware, reviewer_middleware};

pub use crate::state::{AppState, BootstrapError};

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Stores, reconciler and review service shared by handlers
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Claim routes and review actions
    let claims_routes = Router::new()
        .route("/", post(claims::register_claim).get(claims::list_claims))
        .route("/:id", get(claims::get_claim))
        .route("/:id/draft", put(review::save_draft))
        .route("/:id/transmission", post(review::mark_transmitted))
        .route("/:id/route", post(review::resolve_route))
        .route("/:id/inbound-fax", post(review::record_inbound_fax))
        .route("/:id/ocr", post(review::record_ocr_extraction))
        .route("/:id/refinement", post(review::complete_refinement))
        .route("/:id/discovery", post(review::open_discovery))
        .route("/:id/cms-escalation", post(review::escalate_to_cms))
        .route("/:id/learn", post(review::learn_from_edit));

    let api_routes = Router::new()
        .route("/reconcile", post(reconcile::run_reconcile))
        .route("/rules", get(rules::list_rules).put(rules::upsert_rule))
        .route("/routes", get(rules::list_routes).put(rules::upsert_route))
        .route("/routes/resolve", get(rules::resolve_route))
        .route("/omnibus", get(review::omnibus))
        .route("/follow-ups", get(review::follow_ups))
        .nest("/claims", claims_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn(reviewer_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
