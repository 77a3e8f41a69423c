//! Database error classification helpers.

/// Primary key constraint on `tracking_numbers.tracking_number`.
pub const TRACKING_NUMBER_CONSTRAINT: &str = "tracking_numbers_pkey";

/// Returns the violated constraint if `e` is a uniqueness violation.
///
/// Yields `"unknown"` when the driver does not report a constraint name.
pub fn unique_violation_constraint(e: &sqlx::Error) -> Option<&str> {
    let db_err = e.as_database_error()?;

    if !db_err.is_unique_violation() {
        return None;
    }

    Some(db_err.constraint().unwrap_or("unknown"))
}

/// Returns `true` if `e` is a uniqueness violation on the tracking number key.
pub fn is_unique_violation_on_tracking_number(e: &sqlx::Error) -> bool {
    unique_violation_constraint(e) == Some(TRACKING_NUMBER_CONSTRAINT)
}
