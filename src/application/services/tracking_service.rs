//! Tracking number issuance and lookup.

use std::sync::Arc;

use chrono::Utc;

use crate::application::services::RetryPolicy;
use crate::domain::entities::{Shipment, ShipmentRequest, TrackingRecord};
use crate::domain::repositories::TrackingRepository;
use crate::error::AppError;
use crate::utils::code_generator::TrackingCodeGenerator;

/// Why the previous candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collision {
    /// The existence lookup found the code.
    Lookup,
    /// The store rejected the insert as a duplicate.
    Insert,
}

impl Collision {
    fn stage(self) -> &'static str {
        match self {
            Collision::Lookup => "lookup",
            Collision::Insert => "insert",
        }
    }
}

/// Issues unique tracking numbers and looks them up.
///
/// Uniqueness is resolved without a central allocator: a candidate is looked up,
/// and on a hit (or a lost insert race) a fallback candidate is generated. The
/// store's own uniqueness constraint is what makes the result safe under
/// concurrency; the lookup only avoids needless insert failures.
pub struct TrackingService<R: TrackingRepository + ?Sized> {
    repository: Arc<R>,
    generator: Arc<TrackingCodeGenerator>,
    retry_policy: RetryPolicy,
}

impl<R: TrackingRepository + ?Sized> TrackingService<R> {
    /// Creates a new tracking service.
    pub fn new(
        repository: Arc<R>,
        generator: Arc<TrackingCodeGenerator>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            repository,
            generator,
            retry_policy,
        }
    }

    /// Validates the request, generates a unique tracking number and persists it.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidInput`] if any field violates its constraints; nothing
    ///   is generated in that case
    /// - [`AppError::Generation`] if no valid candidate can be composed
    /// - [`AppError::Duplicate`] if every attempt collided with an existing code
    /// - [`AppError::Internal`] on storage errors
    pub async fn create_tracking(&self, request: ShipmentRequest) -> Result<TrackingRecord, AppError> {
        let shipment = request.into_shipment()?;
        tracing::debug!(
            origin = %shipment.origin_country_id,
            destination = %shipment.destination_country_id,
            customer_id = %shipment.customer_id,
            "Creating tracking number"
        );

        let record = self.generate_and_persist(&shipment).await.inspect_err(|e| {
            if matches!(e, AppError::Generation { .. }) {
                metrics::counter!("tracking_number_generation_failures_total").increment(1);
            }
        })?;

        metrics::counter!("tracking_numbers_created_total").increment(1);
        tracing::info!(tracking_number = %record.tracking_number, "Created tracking number");

        Ok(record)
    }

    /// Looks up a tracking record by its exact tracking number.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record matches.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn get_tracking(&self, tracking_number: &str) -> Result<TrackingRecord, AppError> {
        self.repository
            .find_by_code(tracking_number)
            .await?
            .ok_or_else(|| {
                tracing::debug!(tracking_number, "Tracking number not found");
                AppError::not_found(format!(
                    "Tracking details not found for ID: {tracking_number}"
                ))
            })
    }

    /// Checks that the backing store is reachable.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Looks up and inserts candidates until one sticks or attempts run out.
    async fn generate_and_persist(&self, shipment: &Shipment) -> Result<TrackingRecord, AppError> {
        let mut candidate = self.generator.generate(shipment)?;
        let mut delays = self.retry_policy.delays();
        for attempt in 1..=self.retry_policy.max_attempts {
            if attempt > 1 {
                if let Some(delay) = delays.next()
                    && !delay.is_zero()
                {
                    tokio::time::sleep(delay).await;
                }
                candidate = self.generator.regenerate(
                    &shipment.origin_country_id,
                    &shipment.destination_country_id,
                )?;
            }

            let collision = if self.repository.exists(&candidate).await? {
                Collision::Lookup
            } else {
                let record = TrackingRecord::new(candidate.clone(), Utc::now(), shipment);
                match self.repository.insert(record).await {
                    Ok(saved) => return Ok(saved),
                    Err(AppError::Duplicate { .. }) => Collision::Insert,
                    Err(e) => return Err(e),
                }
            };

            metrics::counter!("tracking_number_collisions_total", "stage" => collision.stage())
                .increment(1);
            tracing::warn!(
                tracking_number = %candidate,
                attempt,
                stage = collision.stage(),
                "Tracking number collision, regenerating"
            );
        }

        Err(AppError::duplicate(format!(
            "Tracking number {candidate} already exists; no free candidate after {} attempts",
            self.retry_policy.max_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockTrackingRepository;
    use crate::infrastructure::persistence::InMemoryTrackingRepository;
    use mockall::Sequence;
    use rand::RngCore;
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::str::FromStr;
    use uuid::Uuid;

    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    fn valid_request() -> ShipmentRequest {
        ShipmentRequest {
            origin_country_id: Some("US".to_string()),
            destination_country_id: Some("IN".to_string()),
            weight: Some(Decimal::from_str("1.5").unwrap()),
            customer_id: Some(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap()),
            customer_slug: Some("example-customer".to_string()),
        }
    }

    fn service_with<R: TrackingRepository>(
        repo: R,
        generator: TrackingCodeGenerator,
        max_attempts: u32,
    ) -> TrackingService<R> {
        TrackingService::new(
            Arc::new(repo),
            Arc::new(generator),
            RetryPolicy::immediate(max_attempts),
        )
    }

    #[tokio::test]
    async fn test_create_tracking_success() {
        let mut mock = MockTrackingRepository::new();
        mock.expect_exists().times(1).returning(|_| Ok(false));
        mock.expect_insert()
            .withf(|record| record.tracking_number == "USIN55AAAA15OAAA")
            .times(1)
            .returning(Ok);

        let service = service_with(mock, TrackingCodeGenerator::new(ZeroRng), 10);
        let record = service.create_tracking(valid_request()).await.unwrap();

        assert_eq!(record.tracking_number, "USIN55AAAA15OAAA");
        assert_eq!(record.origin_country_id, "US");
        assert_eq!(record.customer_slug, "example-customer");
    }

    #[tokio::test]
    async fn test_create_tracking_regenerates_after_lookup_collision() {
        let mut mock = MockTrackingRepository::new();
        let mut seq = Sequence::new();

        mock.expect_exists()
            .withf(|code| code == "USIN55AAAA15OAAA")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        mock.expect_exists()
            .withf(|code| code == "USINAAAAAAAAAAAA")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        mock.expect_insert()
            .withf(|record| record.tracking_number == "USINAAAAAAAAAAAA")
            .times(1)
            .in_sequence(&mut seq)
            .returning(Ok);

        let service = service_with(mock, TrackingCodeGenerator::new(ZeroRng), 10);
        let record = service.create_tracking(valid_request()).await.unwrap();

        assert_eq!(record.tracking_number, "USINAAAAAAAAAAAA");
    }

    #[tokio::test]
    async fn test_create_tracking_retries_after_lost_insert_race() {
        let mut mock = MockTrackingRepository::new();
        let mut seq = Sequence::new();

        mock.expect_exists().times(1).in_sequence(&mut seq).returning(|_| Ok(false));
        mock.expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::duplicate("taken")));
        mock.expect_exists().times(1).in_sequence(&mut seq).returning(|_| Ok(false));
        mock.expect_insert().times(1).in_sequence(&mut seq).returning(Ok);

        let service = service_with(mock, TrackingCodeGenerator::from_os_rng(), 10);
        let record = service.create_tracking(valid_request()).await.unwrap();

        assert!(record.tracking_number.starts_with("USIN"));
    }

    #[tokio::test]
    async fn test_create_tracking_exhausted_attempts_is_duplicate() {
        let mut mock = MockTrackingRepository::new();
        mock.expect_exists().times(3).returning(|_| Ok(true));
        mock.expect_insert().times(0);

        let service = service_with(mock, TrackingCodeGenerator::from_os_rng(), 3);
        let err = service.create_tracking(valid_request()).await.unwrap_err();

        assert!(matches!(err, AppError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_create_tracking_exhausted_insert_races_is_duplicate() {
        let mut mock = MockTrackingRepository::new();
        mock.expect_exists().times(2).returning(|_| Ok(false));
        mock.expect_insert()
            .times(2)
            .returning(|_| Err(AppError::duplicate("taken")));

        let service = service_with(mock, TrackingCodeGenerator::from_os_rng(), 2);
        let err = service.create_tracking(valid_request()).await.unwrap_err();

        assert!(matches!(err, AppError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_create_tracking_invalid_input_touches_nothing() {
        let mut mock = MockTrackingRepository::new();
        mock.expect_exists().times(0);
        mock.expect_insert().times(0);

        let service = service_with(mock, TrackingCodeGenerator::from_os_rng(), 10);
        let request = ShipmentRequest {
            origin_country_id: Some(" ".to_string()),
            customer_slug: None,
            ..valid_request()
        };

        let err = service.create_tracking(request).await.unwrap_err();

        match err {
            AppError::InvalidInput { violations } => {
                assert!(violations.contains("originCountryId"));
                assert!(violations.contains("customerSlug"));
                assert_eq!(violations.len(), 2);
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_tracking_overflow_is_generation_error() {
        let mut mock = MockTrackingRepository::new();
        mock.expect_exists().times(0);

        let service = service_with(mock, TrackingCodeGenerator::from_os_rng(), 10);
        let request = ShipmentRequest {
            weight: Some(Decimal::from_str("1000000000").unwrap()),
            ..valid_request()
        };

        let err = service.create_tracking(request).await.unwrap_err();

        assert!(matches!(err, AppError::Generation { .. }));
    }

    #[tokio::test]
    async fn test_create_tracking_storage_error_propagates() {
        let mut mock = MockTrackingRepository::new();
        mock.expect_exists()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error")));
        mock.expect_insert().times(0);

        let service = service_with(mock, TrackingCodeGenerator::from_os_rng(), 10);
        let err = service.create_tracking(valid_request()).await.unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_get_tracking_found() {
        let mut mock = MockTrackingRepository::new();
        mock.expect_find_by_code()
            .withf(|code| code == "USIN55AAAA15OAAA")
            .times(1)
            .returning(|code| {
                let shipment = valid_request().into_shipment().unwrap();
                Ok(Some(TrackingRecord::new(code.to_string(), Utc::now(), &shipment)))
            });

        let service = service_with(mock, TrackingCodeGenerator::from_os_rng(), 10);
        let record = service.get_tracking("USIN55AAAA15OAAA").await.unwrap();

        assert_eq!(record.tracking_number, "USIN55AAAA15OAAA");
    }

    #[tokio::test]
    async fn test_get_tracking_not_found() {
        let mut mock = MockTrackingRepository::new();
        mock.expect_find_by_code().times(1).returning(|_| Ok(None));

        let service = service_with(mock, TrackingCodeGenerator::from_os_rng(), 10);
        let err = service.get_tracking("ZZZZZZZZZZZZZZZZ").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(err.to_string().contains("ZZZZZZZZZZZZZZZZ"));
    }

    #[tokio::test]
    async fn test_created_record_round_trips_through_store() {
        let service = service_with(
            InMemoryTrackingRepository::new(),
            TrackingCodeGenerator::from_os_rng(),
            10,
        );

        let created = service.create_tracking(valid_request()).await.unwrap();
        let fetched = service.get_tracking(&created.tracking_number).await.unwrap();

        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn test_every_candidate_taken_is_duplicate() {
        let repo = InMemoryTrackingRepository::new();
        let shipment = valid_request().into_shipment().unwrap();
        for code in ["USIN55AAAA15OAAA", "USINAAAAAAAAAAAA"] {
            repo.insert(TrackingRecord::new(code.to_string(), Utc::now(), &shipment))
                .await
                .unwrap();
        }

        let service = service_with(repo, TrackingCodeGenerator::new(ZeroRng), 3);
        let err = service.create_tracking(valid_request()).await.unwrap_err();

        assert!(matches!(err, AppError::Duplicate { .. }));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_colliding_requests_never_duplicate() {
        // With a constant random source only two codes exist: the primary and the fallback.
        let repo = Arc::new(InMemoryTrackingRepository::new());
        let service = Arc::new(TrackingService::new(
            repo.clone(),
            Arc::new(TrackingCodeGenerator::new(ZeroRng)),
            RetryPolicy::immediate(3),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.create_tracking(valid_request()).await })
            })
            .collect();

        let mut issued = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(record) => issued.push(record.tracking_number),
                Err(e) => assert!(matches!(e, AppError::Duplicate { .. }), "unexpected error {e:?}"),
            }
        }

        let unique: HashSet<_> = issued.iter().cloned().collect();
        assert_eq!(issued.len(), 2);
        assert_eq!(unique.len(), 2);
        assert!(unique.contains("USIN55AAAA15OAAA"));
        assert!(unique.contains("USINAAAAAAAAAAAA"));
        assert_eq!(repo.len(), 2);
    }

    type Counts = Arc<std::sync::Mutex<std::collections::HashMap<String, u64>>>;

    /// Thread-local recorder that sums counters by `name{label=value}`.
    #[derive(Default)]
    struct CountingRecorder(Counts);

    struct CountingHandle {
        key: String,
        counts: Counts,
    }

    impl metrics::CounterFn for CountingHandle {
        fn increment(&self, value: u64) {
            *self.counts.lock().unwrap().entry(self.key.clone()).or_default() += value;
        }

        fn absolute(&self, value: u64) {
            self.counts.lock().unwrap().insert(self.key.clone(), value);
        }
    }

    impl metrics::Recorder for CountingRecorder {
        fn describe_counter(
            &self,
            _: metrics::KeyName,
            _: Option<metrics::Unit>,
            _: metrics::SharedString,
        ) {
        }

        fn describe_gauge(
            &self,
            _: metrics::KeyName,
            _: Option<metrics::Unit>,
            _: metrics::SharedString,
        ) {
        }

        fn describe_histogram(
            &self,
            _: metrics::KeyName,
            _: Option<metrics::Unit>,
            _: metrics::SharedString,
        ) {
        }

        fn register_counter(&self, key: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Counter {
            let labels: Vec<String> = key
                .labels()
                .map(|label| format!("{}={}", label.key(), label.value()))
                .collect();
            let name = if labels.is_empty() {
                key.name().to_string()
            } else {
                format!("{}{{{}}}", key.name(), labels.join(","))
            };

            metrics::Counter::from_arc(Arc::new(CountingHandle {
                key: name,
                counts: self.0.clone(),
            }))
        }

        fn register_gauge(&self, _: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Gauge {
            metrics::Gauge::noop()
        }

        fn register_histogram(
            &self,
            _: &metrics::Key,
            _: &metrics::Metadata<'_>,
        ) -> metrics::Histogram {
            metrics::Histogram::noop()
        }
    }

    #[test]
    fn test_documented_counters_are_emitted() {
        let recorder = CountingRecorder::default();
        let counts = recorder.0.clone();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let repo = InMemoryTrackingRepository::new();
                let shipment = valid_request().into_shipment().unwrap();
                repo.insert(TrackingRecord::new(
                    "USIN55AAAA15OAAA".to_string(),
                    Utc::now(),
                    &shipment,
                ))
                .await
                .unwrap();
                let service = service_with(repo, TrackingCodeGenerator::new(ZeroRng), 3);

                service.create_tracking(valid_request()).await.unwrap();

                let heavy = ShipmentRequest {
                    weight: Some(Decimal::from_str("1000000000").unwrap()),
                    ..valid_request()
                };
                let err = service.create_tracking(heavy).await.unwrap_err();
                assert!(matches!(err, AppError::Generation { .. }));
            })
        });

        let counts = counts.lock().unwrap();
        assert_eq!(counts.get("tracking_numbers_created_total"), Some(&1));
        assert_eq!(
            counts.get("tracking_number_collisions_total{stage=lookup}"),
            Some(&1)
        );
        assert_eq!(counts.get("tracking_number_generation_failures_total"), Some(&1));
    }
}
