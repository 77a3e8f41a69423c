//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /v1/api/next-tracking-number` - Issue a tracking number (rate limited)
//! - `GET /v1/api/tracking-details`     - Look up a tracking number (rate limited)
//! - `GET /health`                      - Storage health check
//! - `GET /active-profile`              - Configured profile name
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/v1/api`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{active_profile_handler, health_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// The returned service must be served with connect info
/// (`into_make_service_with_connect_info::<SocketAddr>`) for per-IP rate limiting.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = api::routes::tracking_routes().layer(rate_limit::layer());

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/active-profile", get(active_profile_handler))
        .nest("/v1/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
