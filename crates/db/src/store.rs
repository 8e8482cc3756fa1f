//! PostgreSQL-backed [`RecordStore`].

use async_trait::async_trait;
use crewrisk_core::records::{CrewRecord, PredictionResult};
use crewrisk_core::store::{RecordStore, StoreError};
use crewrisk_core::types::Timestamp;

use crate::repositories::{CrewRepo, PredictionRepo};
use crate::DbPool;

/// PostgreSQL SQLSTATE for unique constraint violations.
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// Classify a sqlx error by SQLSTATE. Only `23505` is a uniqueness violation.
pub fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
            return StoreError::UniqueViolation {
                constraint: db_err.constraint().map(str::to_string),
            };
        }
    }
    StoreError::Other(err.to_string())
}

/// Store handle over a shared pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn predictions_exist(&self) -> Result<bool, StoreError> {
        PredictionRepo::exists_any(&self.pool)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn fetch_sources(&self) -> Result<Vec<CrewRecord>, StoreError> {
        let rows = CrewRepo::list_all(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(rows.into_iter().map(CrewRecord::from).collect())
    }

    async fn insert_predictions(&self, batch: &[PredictionResult]) -> Result<u64, StoreError> {
        PredictionRepo::insert_batch(&self.pool, batch)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn count_predictions(&self) -> Result<u64, StoreError> {
        PredictionRepo::count(&self.pool)
            .await
            .map(to_count)
            .map_err(classify_sqlx_error)
    }

    async fn count_predictions_at(&self, generated_at: Timestamp) -> Result<u64, StoreError> {
        PredictionRepo::count_at(&self.pool, generated_at)
            .await
            .map(to_count)
            .map_err(classify_sqlx_error)
    }

    async fn count_sources_at(&self, at: Timestamp) -> Result<u64, StoreError> {
        CrewRepo::count_created_by(&self.pool, at)
            .await
            .map(to_count)
            .map_err(classify_sqlx_error)
    }

    async fn batch_timestamps(&self) -> Result<Vec<Timestamp>, StoreError> {
        PredictionRepo::batch_timestamps(&self.pool)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn list_predictions(&self) -> Result<Vec<PredictionResult>, StoreError> {
        let rows = PredictionRepo::list_by_score(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        rows.into_iter()
            .map(|row| {
                let id = row.id;
                PredictionResult::try_from(row).map_err(|e| {
                    tracing::error!(id, error = %e, "Corrupt churn_predictions row");
                    StoreError::Other(format!("churn_predictions row {id}: {e}"))
                })
            })
            .collect()
    }
}
