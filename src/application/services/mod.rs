//! Business logic services for the application layer.

pub mod retry_policy;
pub mod tracking_service;

pub use retry_policy::RetryPolicy;
pub use tracking_service::TrackingService;
