//! Domain layer: business entities and storage contracts.
//!
//! - [`entities`] - Shipment input and tracking record data structures
//! - [`repositories`] - Storage trait definitions
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.
//! Business logic lives in [`crate::application::services`].

pub mod entities;
pub mod repositories;
