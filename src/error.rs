//! Application error taxonomy and HTTP translation.
//!
//! Every fallible operation in the service returns [`AppError`]. The variants map
//! one-to-one onto HTTP status codes in [`IntoResponse`]:
//!
//! | Variant        | Status |
//! |----------------|--------|
//! | `InvalidInput` | 400    |
//! | `NotFound`     | 404    |
//! | `Duplicate`    | 409    |
//! | `Generation`   | 500    |
//! | `Internal`     | 500    |
//!
//! Validation failures are returned as a flat `field -> message` JSON object. All other
//! errors use [`ErrorResponse`].

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::ValidationErrors;

use crate::utils::code_generator::GenerationError;
use crate::utils::db_error::{is_unique_violation_on_tracking_number, unique_violation_constraint};

/// Field-level validation failures keyed by wire (camelCase) field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldViolations(BTreeMap<String, String>);

impl FieldViolations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation for `field`. The first message recorded for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Merges `other` into `self` without overwriting existing entries.
    pub fn merge(&mut self, other: FieldViolations) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

impl fmt::Display for FieldViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldViolations {
    fn from(errors: ValidationErrors) -> Self {
        let mut violations = FieldViolations::new();

        for (field, field_errors) in errors.field_errors() {
            // A blank value also fails the length/charset checks; report it as blank.
            let Some(error) = field_errors
                .iter()
                .find(|e| e.code == "blank")
                .or_else(|| field_errors.first())
            else {
                continue;
            };
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            violations.add(to_camel_case(&field), message);
        }

        violations
    }
}

/// Converts a Rust field name (`origin_country_id`) to its wire name (`originCountryId`).
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;

    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// Error body for every non-validation failure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub error: &'static str,
    pub status: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {violations}")]
    InvalidInput { violations: FieldViolations },

    #[error("{message}")]
    Generation { message: String },

    #[error("{message}")]
    Duplicate { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl AppError {
    pub fn invalid_input(violations: FieldViolations) -> Self {
        Self::InvalidInput { violations }
    }
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate {
            message: message.into(),
        }
    }
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Duplicate { .. } => StatusCode::CONFLICT,
            AppError::Generation { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Human-readable error kind used as the `error` field of [`ErrorResponse`].
    pub fn label(&self) -> &'static str {
        match self {
            AppError::InvalidInput { .. } => "Invalid Input Error",
            AppError::Generation { .. } => "Tracking Number Generation Error",
            AppError::Duplicate { .. } => "Duplicate Tracking Number Error",
            AppError::NotFound { .. } => "Tracking ID not found",
            AppError::Internal { .. } => "Internal Server Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.label(), "Request failed");
        } else {
            tracing::warn!(error = %self, kind = self.label(), "Request rejected");
        }

        match self {
            AppError::InvalidInput { violations } => (status, Json(violations)).into_response(),
            other => {
                let body = ErrorResponse {
                    timestamp: Utc::now(),
                    error: other.label(),
                    status: status.as_u16(),
                    message: other.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::invalid_input(errors.into())
    }
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        AppError::generation(e.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation_on_tracking_number(&e) {
            return AppError::duplicate("Tracking number already exists");
        }

        match unique_violation_constraint(&e) {
            Some(constraint) => {
                tracing::error!(error = %e, constraint, "Unexpected unique constraint violation")
            }
            None => tracing::error!(error = %e, "Database error"),
        }
        AppError::internal("Database error")
    }
}
