//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod profile;
pub mod tracking;

pub use health::health_handler;
pub use profile::active_profile_handler;
pub use tracking::{next_tracking_number_handler, tracking_details_handler};
