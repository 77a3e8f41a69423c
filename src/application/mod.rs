//! Application layer services implementing business logic.
//!
//! Services coordinate validation, code generation and repository calls, and
//! expose a small API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::tracking_service::TrackingService`] - Tracking number issuance and lookup
//! - [`services::retry_policy::RetryPolicy`] - Collision retry bounds and backoff

pub mod services;
