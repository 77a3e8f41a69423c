//! Shipment attributes supplied by callers when requesting a tracking number.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::AppError;

/// Country codes must be plain ASCII letters and digits.
static COUNTRY_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("country code regex is valid"));

/// Smallest accepted shipment weight, in kilograms.
const MIN_WEIGHT: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Unvalidated request for a new tracking number.
///
/// Every field is optional so that a missing attribute is reported as a field
/// violation rather than silently defaulted. [`ShipmentRequest::into_shipment`]
/// checks all constraints in one pass and reports every violated field.
#[derive(Debug, Clone, Default, Validate)]
pub struct ShipmentRequest {
    #[validate(
        required(message = "Origin country ID cannot be blank"),
        custom(function = "not_blank", message = "Origin country ID cannot be blank"),
        length(max = 3, message = "Origin country ID must be at most 3 characters long"),
        regex(
            path = "*COUNTRY_CODE_REGEX",
            message = "Origin country ID must contain only letters and digits"
        )
    )]
    pub origin_country_id: Option<String>,

    #[validate(
        required(message = "Destination country ID cannot be blank"),
        custom(function = "not_blank", message = "Destination country ID cannot be blank"),
        length(max = 3, message = "Destination country ID must be at most 3 characters long"),
        regex(
            path = "*COUNTRY_CODE_REGEX",
            message = "Destination country ID must contain only letters and digits"
        )
    )]
    pub destination_country_id: Option<String>,

    /// Weight in kilograms.
    #[validate(
        required(message = "Weight is required"),
        custom(function = "validate_weight")
    )]
    pub weight: Option<Decimal>,

    #[validate(required(message = "Customer ID is required"))]
    pub customer_id: Option<Uuid>,

    #[validate(
        required(message = "Customer slug cannot be blank"),
        custom(function = "not_blank", message = "Customer slug cannot be blank"),
        length(max = 50, message = "Customer slug must be at most 50 characters long")
    )]
    pub customer_slug: Option<String>,
}

impl ShipmentRequest {
    /// Validates every field and returns the typed shipment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] listing every violated field.
    pub fn into_shipment(self) -> Result<Shipment, AppError> {
        self.validate()?;

        match (
            self.origin_country_id,
            self.destination_country_id,
            self.weight,
            self.customer_id,
            self.customer_slug,
        ) {
            (
                Some(origin_country_id),
                Some(destination_country_id),
                Some(weight),
                Some(customer_id),
                Some(customer_slug),
            ) => Ok(Shipment {
                origin_country_id,
                destination_country_id,
                weight,
                customer_id,
                customer_slug,
            }),
            _ => Err(AppError::internal(
                "Shipment request passed validation with missing fields",
            )),
        }
    }
}

/// Validated shipment attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shipment {
    pub origin_country_id: String,
    pub destination_country_id: String,
    pub weight: Decimal,
    pub customer_id: Uuid,
    pub customer_slug: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_weight(weight: &Decimal) -> Result<(), ValidationError> {
    if weight.is_sign_negative() || weight.is_zero() {
        return Err(ValidationError::new("positive")
            .with_message(Cow::Borrowed("Weight must be a positive number")));
    }
    if *weight < MIN_WEIGHT {
        return Err(ValidationError::new("min")
            .with_message(Cow::Borrowed("Weight must be at least 0.1")));
    }
    Ok(())
}
