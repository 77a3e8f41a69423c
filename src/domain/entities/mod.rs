//! Core domain entities.
//!
//! - [`ShipmentRequest`] - Unvalidated caller input, every field optional
//! - [`Shipment`] - Validated shipment attributes
//! - [`TrackingRecord`] - A persisted tracking number with its shipment copy
//!
//! Entities are plain data; validation lives on [`ShipmentRequest`] and
//! generation in [`crate::utils::code_generator`].

pub mod shipment;
pub mod tracking_record;

pub use shipment::{Shipment, ShipmentRequest};
pub use tracking_record::TrackingRecord;
