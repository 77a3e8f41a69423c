//! Tracking record entity: a persisted tracking number and the shipment it was issued for.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::Shipment;

/// A tracking number together with the shipment attributes it was generated from.
///
/// Records are written once and never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRecord {
    pub tracking_number: String,
    pub created_at: DateTime<Utc>,
    pub origin_country_id: String,
    pub destination_country_id: String,
    pub weight: Decimal,
    pub customer_id: Uuid,
    pub customer_slug: String,
}

impl TrackingRecord {
    /// Builds a record for `shipment` under the given tracking number.
    pub fn new(tracking_number: String, created_at: DateTime<Utc>, shipment: &Shipment) -> Self {
        Self {
            tracking_number,
            created_at,
            origin_country_id: shipment.origin_country_id.clone(),
            destination_country_id: shipment.destination_country_id.clone(),
            weight: shipment.weight,
            customer_id: shipment.customer_id,
            customer_slug: shipment.customer_slug.clone(),
        }
    }
}
