//! In-memory implementation of the tracking repository.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::TrackingRecord;
use crate::domain::repositories::TrackingRepository;
use crate::error::AppError;

/// In-memory tracking store backed by `DashMap`.
///
/// Used for the `memory` storage backend and in tests. Inserts go through the
/// entry API, so the uniqueness check and the write happen under one shard lock.
#[derive(Debug, Default)]
pub struct InMemoryTrackingRepository {
    storage: DashMap<String, TrackingRecord>,
}

impl InMemoryTrackingRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl TrackingRepository for InMemoryTrackingRepository {
    async fn exists(&self, tracking_number: &str) -> Result<bool, AppError> {
        Ok(self.storage.contains_key(tracking_number))
    }

    async fn insert(&self, record: TrackingRecord) -> Result<TrackingRecord, AppError> {
        match self.storage.entry(record.tracking_number.clone()) {
            Entry::Occupied(_) => Err(AppError::duplicate(format!(
                "Tracking number {} already exists",
                record.tracking_number
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_code(
        &self,
        tracking_number: &str,
    ) -> Result<Option<TrackingRecord>, AppError> {
        Ok(self
            .storage
            .get(tracking_number)
            .map(|entry| entry.value().clone()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
