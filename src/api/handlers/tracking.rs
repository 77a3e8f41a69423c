//! Handlers for tracking number issuance and lookup.

use axum::{
    Json,
    extract::{Query, State},
};
use validator::Validate;

use crate::api::dto::tracking::{
    NextTrackingNumberQuery, TrackingDetailsQuery, TrackingResponse, TrackingStatus,
};
use crate::error::{AppError, FieldViolations};
use crate::state::AppState;

/// Issues a new unique tracking number for a shipment.
///
/// # Endpoint
///
/// `GET /v1/api/next-tracking-number`
///
/// # Query Parameters
///
/// - `originCountryId` - up to 3 letters/digits
/// - `destinationCountryId` - up to 3 letters/digits
/// - `weight` - decimal kilograms, at least 0.1
/// - `customerId` - UUID
/// - `customerSlug` - up to 50 characters
///
/// # Response
///
/// ```json
/// {
///   "trackingNumber": "USIN55K3XQ15OAB2",
///   "createdAt": "2026-10-19T10:00:00Z",
///   "status": "SUCCESS",
///   "estimatedDelivery": "2026-10-22",
///   "priority": "STANDARD"
/// }
/// ```
///
/// # Errors
///
/// - **400** with a `field -> message` map for every invalid or malformed field
/// - **409** if a concurrent request took the final candidate
/// - **500** if no unique number could be generated
pub async fn next_tracking_number_handler(
    State(state): State<AppState>,
    Query(query): Query<NextTrackingNumberQuery>,
) -> Result<Json<TrackingResponse>, AppError> {
    let (request, parse_violations) = query.into_request();

    if !parse_violations.is_empty() {
        let mut violations = parse_violations;
        if let Err(errors) = request.validate() {
            violations.merge(errors.into());
        }
        return Err(AppError::invalid_input(violations));
    }

    let record = state.tracking_service.create_tracking(request).await?;

    Ok(Json(TrackingResponse::from_record(
        record,
        TrackingStatus::Success,
        state.estimated_delivery_days,
    )))
}

/// Returns the details of an issued tracking number.
///
/// # Endpoint
///
/// `GET /v1/api/tracking-details?trackingId=...`
///
/// # Errors
///
/// - **400** if `trackingId` is missing or blank
/// - **404** if no tracking number matches
pub async fn tracking_details_handler(
    State(state): State<AppState>,
    Query(query): Query<TrackingDetailsQuery>,
) -> Result<Json<TrackingResponse>, AppError> {
    let tracking_id = query
        .tracking_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            let mut violations = FieldViolations::new();
            violations.add("trackingId", "Tracking ID is required");
            AppError::invalid_input(violations)
        })?;

    let record = state.tracking_service.get_tracking(&tracking_id).await?;

    Ok(Json(TrackingResponse::from_record(
        record,
        TrackingStatus::InTransit,
        state.estimated_delivery_days,
    )))
}
