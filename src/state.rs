//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::TrackingService;
use crate::domain::repositories::TrackingRepository;

/// Application state cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub tracking_service: Arc<TrackingService<dyn TrackingRepository>>,
    /// Profile name reported by `GET /active-profile`.
    pub profile: Arc<str>,
    /// Days added to today when computing `estimatedDelivery`.
    pub estimated_delivery_days: u64,
}

impl AppState {
    pub fn new(
        tracking_service: Arc<TrackingService<dyn TrackingRepository>>,
        profile: impl Into<Arc<str>>,
        estimated_delivery_days: u64,
    ) -> Self {
        Self {
            tracking_service,
            profile: profile.into(),
            estimated_delivery_days,
        }
    }
}
