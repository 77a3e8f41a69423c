//! DTOs for tracking number endpoints.

use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{ShipmentRequest, TrackingRecord};
use crate::error::FieldViolations;

/// Query parameters for `GET /v1/api/next-tracking-number`.
///
/// All values arrive as raw strings so that a malformed `weight` or
/// `customerId` is reported as a field violation instead of a rejected query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTrackingNumberQuery {
    pub origin_country_id: Option<String>,
    pub destination_country_id: Option<String>,
    pub weight: Option<String>,
    pub customer_id: Option<String>,
    pub customer_slug: Option<String>,
}

impl NextTrackingNumberQuery {
    /// Parses typed fields and returns the request along with any parse failures.
    ///
    /// A field that fails to parse is left as `None` in the request; callers should
    /// prefer the parse message over the resulting "required" violation.
    pub fn into_request(self) -> (ShipmentRequest, FieldViolations) {
        let mut violations = FieldViolations::new();

        let weight = self.weight.and_then(|raw| {
            Decimal::from_str(raw.trim())
                .inspect_err(|_| violations.add("weight", "Weight must be a decimal number"))
                .ok()
        });

        let customer_id = self.customer_id.and_then(|raw| {
            Uuid::parse_str(raw.trim())
                .inspect_err(|_| violations.add("customerId", "Customer ID must be a valid UUID"))
                .ok()
        });

        let request = ShipmentRequest {
            origin_country_id: self.origin_country_id,
            destination_country_id: self.destination_country_id,
            weight,
            customer_id,
            customer_slug: self.customer_slug,
        };

        (request, violations)
    }
}

/// Query parameters for `GET /v1/api/tracking-details`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingDetailsQuery {
    pub tracking_id: Option<String>,
}

/// Shipment status reported alongside a tracking number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingStatus {
    /// Returned when the number was just issued.
    Success,
    /// Returned when an existing number is looked up.
    InTransit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Standard,
}

/// Tracking number payload returned by both tracking endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResponse {
    pub tracking_number: String,
    pub created_at: DateTime<Utc>,
    pub status: TrackingStatus,
    pub estimated_delivery: NaiveDate,
    pub priority: Priority,
}

impl TrackingResponse {
    /// Builds the payload; `estimatedDelivery` is today (UTC) plus `delivery_days`.
    pub fn from_record(record: TrackingRecord, status: TrackingStatus, delivery_days: u64) -> Self {
        let today = Utc::now().date_naive();

        Self {
            tracking_number: record.tracking_number,
            created_at: record.created_at,
            status,
            estimated_delivery: today.checked_add_days(Days::new(delivery_days)).unwrap_or(today),
            priority: Priority::Standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_query() -> NextTrackingNumberQuery {
        NextTrackingNumberQuery {
            origin_country_id: Some("US".to_string()),
            destination_country_id: Some("IN".to_string()),
            weight: Some("1.5".to_string()),
            customer_id: Some("550e8400-e29b-41d4-a716-446655440000".to_string()),
            customer_slug: Some("example-customer".to_string()),
        }
    }

    #[test]
    fn test_into_request_parses_typed_fields() {
        let (request, violations) = full_query().into_request();

        assert!(violations.is_empty());
        assert_eq!(request.weight, Some(Decimal::from_str("1.5").unwrap()));
        assert_eq!(
            request.customer_id,
            Some(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap())
        );
    }

    #[test]
    fn test_into_request_reports_malformed_values() {
        let query = NextTrackingNumberQuery {
            weight: Some("heavy".to_string()),
            customer_id: Some("not-a-uuid".to_string()),
            ..full_query()
        };

        let (request, violations) = query.into_request();

        assert_eq!(violations.len(), 2);
        assert_eq!(violations.get("weight"), Some("Weight must be a decimal number"));
        assert_eq!(violations.get("customerId"), Some("Customer ID must be a valid UUID"));
        assert!(request.weight.is_none());
        assert!(request.customer_id.is_none());
    }

    #[test]
    fn test_missing_values_are_not_parse_failures() {
        let (_, violations) = NextTrackingNumberQuery::default().into_request();

        assert!(violations.is_empty());
    }

    #[test]
    fn test_response_serialization() {
        let shipment = ShipmentRequest {
            origin_country_id: Some("US".to_string()),
            destination_country_id: Some("IN".to_string()),
            weight: Some(Decimal::ONE),
            customer_id: Some(Uuid::nil()),
            customer_slug: Some("acme".to_string()),
        }
        .into_shipment()
        .unwrap();
        let record = TrackingRecord::new("USIN00AAAA0AAAAA".to_string(), Utc::now(), &shipment);

        let response = TrackingResponse::from_record(record, TrackingStatus::InTransit, 3);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["trackingNumber"], "USIN00AAAA0AAAAA");
        assert_eq!(json["status"], "IN_TRANSIT");
        assert_eq!(json["priority"], "STANDARD");
        assert!(json.get("createdAt").is_some());

        let expected = Utc::now().date_naive() + Days::new(3);
        assert_eq!(json["estimatedDelivery"], expected.to_string());
    }
}
