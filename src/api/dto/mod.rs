//! Data Transfer Objects for API requests and responses.
//!
//! Query DTOs carry raw strings; typed parsing and validation happen before the
//! values reach the service layer.

pub mod health;
pub mod tracking;
