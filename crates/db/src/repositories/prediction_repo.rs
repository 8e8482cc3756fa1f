//! Repository for the `churn_predictions` table.

use crewrisk_core::records::PredictionResult;
use crewrisk_core::types::Timestamp;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::prediction::ChurnPrediction;

/// Column list for churn_predictions queries.
const COLUMNS: &str = "id, subject_id, risk_score, risk_level, factors, generated_at, created_at";

/// Provides the write-once batch insert and read views over predictions.
pub struct PredictionRepo;

impl PredictionRepo {
    /// `true` if at least one prediction row exists. Stops at the first row.
    pub async fn exists_any(pool: &PgPool) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM churn_predictions LIMIT 1)")
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Insert a whole batch in one statement, so PostgreSQL applies all rows or none.
    ///
    /// Returns the number of rows written. A subject already present fails the
    /// statement with `uq_churn_predictions_subject_id`.
    pub async fn insert_batch(
        pool: &PgPool,
        batch: &[PredictionResult],
    ) -> Result<u64, sqlx::Error> {
        if batch.is_empty() {
            return Ok(0);
        }

        let subject_ids: Vec<Uuid> = batch.iter().map(|p| p.subject_id).collect();
        let scores: Vec<i32> = batch.iter().map(|p| i32::from(p.risk_score)).collect();
        let levels: Vec<String> = batch
            .iter()
            .map(|p| p.risk_level.as_str().to_string())
            .collect();
        let factors: Vec<serde_json::Value> = batch
            .iter()
            .map(|p| serde_json::Value::from(p.factors.clone()))
            .collect();
        let generated_at: Vec<Timestamp> = batch.iter().map(|p| p.generated_at).collect();

        let result = sqlx::query(
            "INSERT INTO churn_predictions \
                (subject_id, risk_score, risk_level, factors, generated_at) \
             SELECT * FROM UNNEST($1::uuid[], $2::int[], $3::text[], $4::jsonb[], $5::timestamptz[])",
        )
        .bind(&subject_ids)
        .bind(&scores)
        .bind(&levels)
        .bind(&factors)
        .bind(&generated_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM churn_predictions")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Rows stamped with exactly `generated_at`.
    pub async fn count_at(pool: &PgPool, generated_at: Timestamp) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM churn_predictions WHERE generated_at = $1")
                .bind(generated_at)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Distinct batch timestamps, oldest first.
    pub async fn batch_timestamps(pool: &PgPool) -> Result<Vec<Timestamp>, sqlx::Error> {
        let rows: Vec<(Timestamp,)> = sqlx::query_as(
            "SELECT DISTINCT generated_at FROM churn_predictions ORDER BY generated_at",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(ts,)| ts).collect())
    }

    /// All predictions, highest risk first.
    pub async fn list_by_score(pool: &PgPool) -> Result<Vec<ChurnPrediction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM churn_predictions ORDER BY risk_score DESC, subject_id"
        );
        sqlx::query_as::<_, ChurnPrediction>(&query)
            .fetch_all(pool)
            .await
    }
}
