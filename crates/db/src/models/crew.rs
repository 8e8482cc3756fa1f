//! Row types for the upstream `crew` table.

use crewrisk_core::records::CrewRecord;
use crewrisk_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `crew` table, restricted to the columns the service reads.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Crew {
    pub id: Uuid,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub outlet: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a crew record. `created_at` is set by the database.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCrew {
    pub id: Uuid,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub outlet: Option<String>,
}

impl From<Crew> for CrewRecord {
    fn from(row: Crew) -> Self {
        CrewRecord {
            id: row.id,
            full_name: row.full_name,
            role: row.role,
            is_active: row.is_active,
            outlet: row.outlet,
            created_at: row.created_at,
        }
    }
}
