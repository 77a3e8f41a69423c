//! Repository trait for tracking record storage.

use crate::domain::entities::TrackingRecord;
use crate::error::AppError;
use async_trait::async_trait;

/// Storage for tracking records, keyed by tracking number.
///
/// Implementations MUST reject a second insert of the same tracking number with
/// [`AppError::Duplicate`]. The existence lookup used by the service is only an
/// optimization; the insert is what guarantees uniqueness.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTrackingRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::InMemoryTrackingRepository`] - `DashMap`
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackingRepository: Send + Sync {
    /// Returns `true` if a record with this tracking number exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn exists(&self, tracking_number: &str) -> Result<bool, AppError>;

    /// Persists a new record and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Duplicate`] if the tracking number is already taken.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, record: TrackingRecord) -> Result<TrackingRecord, AppError>;

    /// Finds a record by its exact tracking number.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_code(&self, tracking_number: &str)
    -> Result<Option<TrackingRecord>, AppError>;

    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store cannot be reached.
    async fn ping(&self) -> Result<(), AppError>;
}
