//! Tracking repository implementations.
//!
//! - [`PgTrackingRepository`] - PostgreSQL storage via SQLx
//! - [`InMemoryTrackingRepository`] - `DashMap` storage for development and tests

pub mod memory_tracking_repository;
pub mod pg_tracking_repository;

pub use memory_tracking_repository::InMemoryTrackingRepository;
pub use pg_tracking_repository::PgTrackingRepository;
