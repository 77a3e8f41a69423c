//! PostgreSQL implementation of the tracking repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::TrackingRecord;
use crate::domain::repositories::TrackingRepository;
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on_tracking_number;

/// Row shape of the `tracking_numbers` table.
#[derive(Debug, sqlx::FromRow)]
struct TrackingRow {
    tracking_number: String,
    created_at: DateTime<Utc>,
    origin_country_id: String,
    destination_country_id: String,
    weight: Decimal,
    customer_id: Uuid,
    customer_slug: String,
}

impl From<TrackingRow> for TrackingRecord {
    fn from(row: TrackingRow) -> Self {
        Self {
            tracking_number: row.tracking_number,
            created_at: row.created_at,
            origin_country_id: row.origin_country_id,
            destination_country_id: row.destination_country_id,
            weight: row.weight,
            customer_id: row.customer_id,
            customer_slug: row.customer_slug,
        }
    }
}

/// PostgreSQL repository for tracking records.
///
/// Uniqueness is enforced by the primary key on `tracking_number`.
pub struct PgTrackingRepository {
    pool: Arc<PgPool>,
}

impl PgTrackingRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackingRepository for PgTrackingRepository {
    async fn exists(&self, tracking_number: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tracking_numbers WHERE tracking_number = $1)",
        )
        .bind(tracking_number)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn insert(&self, record: TrackingRecord) -> Result<TrackingRecord, AppError> {
        let row = sqlx::query_as::<_, TrackingRow>(
            r#"
            INSERT INTO tracking_numbers (
                tracking_number, created_at, origin_country_id, destination_country_id,
                weight, customer_id, customer_slug
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING tracking_number, created_at, origin_country_id, destination_country_id,
                      weight, customer_id, customer_slug
            "#,
        )
        .bind(&record.tracking_number)
        .bind(record.created_at)
        .bind(&record.origin_country_id)
        .bind(&record.destination_country_id)
        .bind(record.weight)
        .bind(record.customer_id)
        .bind(&record.customer_slug)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation_on_tracking_number(&e) {
                AppError::duplicate(format!(
                    "Tracking number {} already exists",
                    record.tracking_number
                ))
            } else {
                AppError::from(e)
            }
        })?;

        Ok(row.into())
    }

    async fn find_by_code(
        &self,
        tracking_number: &str,
    ) -> Result<Option<TrackingRecord>, AppError> {
        let row = sqlx::query_as::<_, TrackingRow>(
            r#"
            SELECT tracking_number, created_at, origin_country_id, destination_country_id,
                   weight, customer_id, customer_slug
            FROM tracking_numbers
            WHERE tracking_number = $1
            "#,
        )
        .bind(tracking_number)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
