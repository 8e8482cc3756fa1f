//! Source and result records exchanged with the record store.

use serde::{Deserialize, Serialize};

use crate::risk::{RiskAssessment, RiskLevel, RiskScore};
use crate::types::{SubjectId, Timestamp};

/// A row of the upstream `crew` table. The gate uses `id`; the dashboard
/// reads the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewRecord {
    pub id: SubjectId,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    /// Outlet the crew member works at, if assigned.
    pub outlet: Option<String>,
    /// When the record entered the crew table. A batch stamped `generated_at`
    /// covers every record created at or before that instant.
    pub created_at: Timestamp,
}

/// One persisted risk prediction. All rows of a generation batch share
/// `generated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub subject_id: SubjectId,
    pub risk_score: RiskScore,
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
    pub generated_at: Timestamp,
}

impl PredictionResult {
    pub fn from_assessment(
        subject_id: SubjectId,
        assessment: RiskAssessment,
        generated_at: Timestamp,
    ) -> Self {
        Self {
            subject_id,
            risk_score: assessment.score,
            risk_level: assessment.level,
            factors: assessment.factors,
            generated_at,
        }
    }
}
