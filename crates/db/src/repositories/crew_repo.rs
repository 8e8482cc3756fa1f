//! Repository for the `crew` table.

use crewrisk_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::crew::{CreateCrew, Crew};

/// Column list for crew queries.
const COLUMNS: &str = "id, full_name, role, is_active, outlet, created_at";

/// Read access to crew records.
pub struct CrewRepo;

impl CrewRepo {
    /// List every crew record, ordered by id.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Crew>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM crew ORDER BY id");
        sqlx::query_as::<_, Crew>(&query).fetch_all(pool).await
    }

    /// Crew records created at or before `at`.
    pub async fn count_created_by(pool: &PgPool, at: Timestamp) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM crew WHERE created_at <= $1")
            .bind(at)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Insert a crew record. Used by seeding and tests; the service itself never writes crew.
    pub async fn create(pool: &PgPool, input: &CreateCrew) -> Result<Crew, sqlx::Error> {
        let query = format!(
            "INSERT INTO crew (id, full_name, role, is_active, outlet)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Crew>(&query)
            .bind(input.id)
            .bind(&input.full_name)
            .bind(&input.role)
            .bind(input.is_active)
            .bind(&input.outlet)
            .fetch_one(pool)
            .await
    }
}
