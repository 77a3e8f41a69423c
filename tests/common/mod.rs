#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;
use tracking_service::application::services::{RetryPolicy, TrackingService};
use tracking_service::domain::entities::TrackingRecord;
use tracking_service::domain::repositories::TrackingRepository;
use tracking_service::error::AppError;
use tracking_service::infrastructure::persistence::InMemoryTrackingRepository;
use tracking_service::state::AppState;
use tracking_service::utils::code_generator::TrackingCodeGenerator;

pub const CUSTOMER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

/// Query parameters for a valid US → IN shipment.
pub fn valid_params() -> Vec<(&'static str, &'static str)> {
    vec![
        ("originCountryId", "US"),
        ("destinationCountryId", "IN"),
        ("weight", "1.5"),
        ("customerId", CUSTOMER_ID),
        ("customerSlug", "example-customer"),
    ]
}

pub fn create_test_state() -> AppState {
    create_test_state_with(Arc::new(InMemoryTrackingRepository::new()))
}

pub fn create_test_state_with(repository: Arc<dyn TrackingRepository>) -> AppState {
    let tracking_service = Arc::new(TrackingService::new(
        repository,
        Arc::new(TrackingCodeGenerator::from_os_rng()),
        RetryPolicy::immediate(10),
    ));

    AppState::new(tracking_service, "test", 3)
}

/// Repository whose backing store is unreachable.
pub struct UnavailableRepository;

#[async_trait]
impl TrackingRepository for UnavailableRepository {
    async fn exists(&self, _tracking_number: &str) -> Result<bool, AppError> {
        Err(AppError::internal("Database error"))
    }

    async fn insert(&self, _record: TrackingRecord) -> Result<TrackingRecord, AppError> {
        Err(AppError::internal("Database error"))
    }

    async fn find_by_code(&self, _tracking_number: &str) -> Result<Option<TrackingRecord>, AppError> {
        Err(AppError::internal("Database error"))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::internal("Database error"))
    }
}

/// Inserts a fixed peer address so per-IP middleware works without a socket.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
