//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Tracking number composition and validation
//! - [`db_error`] - Classification of database errors

pub mod code_generator;
pub mod db_error;
