//! Handler for the active profile endpoint.

use axum::extract::State;

use crate::state::AppState;

/// Reports the configured deployment profile as plain text.
///
/// # Endpoint
///
/// `GET /active-profile`
pub async fn active_profile_handler(State(state): State<AppState>) -> String {
    format!("Active Profile: {}", state.profile)
}
