//! API route configuration.

use crate::api::handlers::{next_tracking_number_handler, tracking_details_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Tracking routes, mounted under `/v1/api`.
///
/// # Endpoints
///
/// - `GET /next-tracking-number` - Issue a new tracking number
/// - `GET /tracking-details`     - Look up an issued tracking number
pub fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/next-tracking-number", get(next_tracking_number_handler))
        .route("/tracking-details", get(tracking_details_handler))
}
