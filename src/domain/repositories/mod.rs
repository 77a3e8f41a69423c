//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.

pub mod tracking_repository;

pub use tracking_repository::TrackingRepository;

#[cfg(test)]
pub use tracking_repository::MockTrackingRepository;
