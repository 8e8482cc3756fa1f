//! Row type for the `churn_predictions` table.

use crewrisk_core::error::CoreError;
use crewrisk_core::records::PredictionResult;
use crewrisk_core::risk::{RiskLevel, RiskScore};
use crewrisk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted prediction row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChurnPrediction {
    pub id: DbId,
    pub subject_id: Uuid,
    pub risk_score: i32,
    pub risk_level: String,
    pub factors: Json<Vec<String>>,
    pub generated_at: Timestamp,
    pub created_at: Timestamp,
}

impl TryFrom<ChurnPrediction> for PredictionResult {
    type Error = CoreError;

    fn try_from(row: ChurnPrediction) -> Result<Self, Self::Error> {
        Ok(PredictionResult {
            subject_id: row.subject_id,
            risk_score: RiskScore::new(row.risk_score)?,
            risk_level: RiskLevel::parse(&row.risk_level)?,
            factors: row.factors.0,
            generated_at: row.generated_at,
        })
    }
}
