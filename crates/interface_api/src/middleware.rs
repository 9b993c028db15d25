//! API middleware

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::info;

use domain_claims::Actor;

/// Header naming the reviewer behind a request
pub const REVIEWER_HEADER: &str = "x-reviewer";

/// Reviewer recorded when a request carries no reviewer header
pub const ANONYMOUS_REVIEWER: &str = "anonymous";

/// Resolves the acting reviewer from the request headers
pub fn reviewer_from_headers(headers: &HeaderMap) -> Actor {
    headers
        .get(REVIEWER_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Actor::reviewer)
        .unwrap_or_else(|| Actor::reviewer(ANONYMOUS_REVIEWER))
}

/// Reviewer identification middleware
///
/// Stores the acting [`Actor`] in the request extensions so review handlers
/// can attribute audit entries.
pub async fn reviewer_middleware(mut request: Request<Body>, next: Next) -> Response {
    let actor = reviewer_from_headers(request.headers());
    request.extensions_mut().insert(actor);
    next.run(request).await
}

/// Audit logging middleware
///
/// Logs every API request with the acting reviewer
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let actor = request
        .extensions()
        .get::<Actor>()
        .map(|a| a.to_string())
        .unwrap_or_else(|| ANONYMOUS_REVIEWER.to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        actor = %actor,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
