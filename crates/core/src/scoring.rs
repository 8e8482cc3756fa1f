//! The scorer seam and the placeholder scorer.
//!
//! A real deployment plugs a trained churn model in behind [`Scorer`]. The
//! only built-in implementation, [`PlaceholderScorer`], draws scores at
//! random and exists so the service can run end-to-end without one.

use async_trait::async_trait;
use rand::Rng;

use crate::error::CoreError;
use crate::records::CrewRecord;
use crate::risk::{RiskAssessment, RiskScore, MAX_SCORE};

/// Failure reported by a [`Scorer`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScorerError {
    #[error("Scorer unavailable: {0}")]
    Unavailable(String),

    #[error("Scorer returned invalid output: {0}")]
    InvalidOutput(String),
}

impl From<CoreError> for ScorerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) | CoreError::Internal(msg) => {
                ScorerError::InvalidOutput(msg)
            }
        }
    }
}

/// Maps a crew record to a risk assessment. Must be free of side effects.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, record: &CrewRecord) -> Result<RiskAssessment, ScorerError>;
}

// ---------------------------------------------------------------------------
// Scorer selection
// ---------------------------------------------------------------------------

/// Scorer kind name accepted in configuration.
pub const SCORER_PLACEHOLDER: &str = "placeholder";

/// All valid scorer kinds.
pub const VALID_SCORER_KINDS: &[&str] = &[SCORER_PLACEHOLDER];

/// Validate that a scorer kind string is one of the known kinds.
pub fn validate_scorer_kind(kind: &str) -> Result<(), CoreError> {
    if VALID_SCORER_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown scorer kind: '{kind}'. Valid kinds: {}",
            VALID_SCORER_KINDS.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Placeholder
// ---------------------------------------------------------------------------

/// Default inclusive lower bound of placeholder scores.
pub const DEFAULT_PLACEHOLDER_MIN: u8 = 20;
/// Default inclusive upper bound of placeholder scores.
pub const DEFAULT_PLACEHOLDER_MAX: u8 = 95;

/// Draws a uniform score in `min..=max` and applies the standard rules.
#[derive(Debug, Clone)]
pub struct PlaceholderScorer {
    min: u8,
    max: u8,
}

impl PlaceholderScorer {
    pub fn new(min: u8, max: u8) -> Result<Self, CoreError> {
        if max > MAX_SCORE {
            return Err(CoreError::Validation(format!(
                "placeholder score max must be <= {MAX_SCORE}, got {max}"
            )));
        }
        if min > max {
            return Err(CoreError::Validation(format!(
                "placeholder score min ({min}) must be <= max ({max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn range(&self) -> (u8, u8) {
        (self.min, self.max)
    }
}

impl Default for PlaceholderScorer {
    fn default() -> Self {
        Self {
            min: DEFAULT_PLACEHOLDER_MIN,
            max: DEFAULT_PLACEHOLDER_MAX,
        }
    }
}

#[async_trait]
impl Scorer for PlaceholderScorer {
    async fn score(&self, _record: &CrewRecord) -> Result<RiskAssessment, ScorerError> {
        let drawn = rand::rng().random_range(self.min..=self.max);
        let score = RiskScore::new(i32::from(drawn))?;
        Ok(RiskAssessment::from_score(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;

    fn crew() -> CrewRecord {
        CrewRecord {
            id: uuid::Uuid::new_v4(),
            full_name: "Test Crew".to_string(),
            role: "crew".to_string(),
            is_active: true,
            outlet: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn placeholder_range_validated() {
        assert!(PlaceholderScorer::new(20, 95).is_ok());
        assert!(PlaceholderScorer::new(50, 50).is_ok());
        assert!(PlaceholderScorer::new(60, 40).is_err());
        assert!(PlaceholderScorer::new(0, 101).is_err());
    }

    #[test]
    fn default_range_matches_constants() {
        assert_eq!(PlaceholderScorer::default().range(), (20, 95));
    }

    #[tokio::test]
    async fn placeholder_scores_stay_in_range_and_follow_rules() {
        let scorer = PlaceholderScorer::default();
        let record = crew();
        for _ in 0..200 {
            let a = scorer.score(&record).await.unwrap();
            assert!((20..=95).contains(&a.score.value()));
            assert!(a.validate().is_ok());
        }
    }

    #[tokio::test]
    async fn degenerate_range_is_deterministic() {
        let scorer = PlaceholderScorer::new(71, 71).unwrap();
        let a = scorer.score(&crew()).await.unwrap();
        assert_eq!(a.score.value(), 71);
        assert_eq!(a.level, RiskLevel::High);
    }

    #[test]
    fn scorer_kind_validation() {
        assert!(validate_scorer_kind("placeholder").is_ok());
        assert!(validate_scorer_kind("logistic").is_err());
    }
}
