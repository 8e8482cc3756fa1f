//! Risk score, level thresholds, and contributing-factor rules.
//!
//! Scores are integers in `0..=100`. The level and factor rules here are the
//! only interpretation of a score the service applies; scorers are expected
//! to build their output through [`RiskAssessment::from_score`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Highest valid score.
pub const MAX_SCORE: u8 = 100;

/// Scores strictly above this are `High`.
pub const HIGH_THRESHOLD: u8 = 70;

/// Scores strictly above this (and not `High`) are `Medium`.
pub const MEDIUM_THRESHOLD: u8 = 40;

/// Scores strictly above this carry the elevated factor list.
pub const FACTOR_THRESHOLD: u8 = 60;

/// Factor labels attached to elevated scores.
pub const FACTOR_AI_RISK: &str = "AI risk";
pub const FACTOR_ATTENDANCE: &str = "Attendance";

/// Single marker attached to scores at or below [`FACTOR_THRESHOLD`].
pub const FACTOR_NOMINAL: &str = "Nominal";

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// A risk score guaranteed to lie in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct RiskScore(u8);

impl RiskScore {
    pub fn new(value: i32) -> Result<Self, CoreError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= MAX_SCORE)
            .map(Self)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "risk_score must be between 0 and {MAX_SCORE}, got {value}"
                ))
            })
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for RiskScore {
    type Error = CoreError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RiskScore> for i32 {
    fn from(score: RiskScore) -> Self {
        i32::from(score.0)
    }
}

impl std::fmt::Display for RiskScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Ordered risk category derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// `> 70` is High, `41..=70` is Medium, `<= 40` is Low.
    pub fn from_score(score: RiskScore) -> Self {
        match score.value() {
            s if s > HIGH_THRESHOLD => RiskLevel::High,
            s if s > MEDIUM_THRESHOLD => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "Low" => Ok(RiskLevel::Low),
            "Medium" => Ok(RiskLevel::Medium),
            "High" => Ok(RiskLevel::High),
            other => Err(CoreError::Validation(format!(
                "Unknown risk level: '{other}'. Valid levels: Low, Medium, High"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Factors
// ---------------------------------------------------------------------------

/// Contributing factors for a score.
pub fn factors_for_score(score: RiskScore) -> Vec<String> {
    if score.value() > FACTOR_THRESHOLD {
        vec![FACTOR_AI_RISK.to_string(), FACTOR_ATTENDANCE.to_string()]
    } else {
        vec![FACTOR_NOMINAL.to_string()]
    }
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

/// What a scorer returns for a single crew record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub score: RiskScore,
    pub level: RiskLevel,
    pub factors: Vec<String>,
}

impl RiskAssessment {
    /// Build an assessment whose level and factors follow the standard rules.
    pub fn from_score(score: RiskScore) -> Self {
        Self {
            score,
            level: RiskLevel::from_score(score),
            factors: factors_for_score(score),
        }
    }

    /// Reject assessments whose level disagrees with the score or that carry no factors.
    pub fn validate(&self) -> Result<(), CoreError> {
        let expected = RiskLevel::from_score(self.score);
        if self.level != expected {
            return Err(CoreError::Validation(format!(
                "risk_level {} does not match score {} (expected {})",
                self.level.as_str(),
                self.score,
                expected.as_str()
            )));
        }
        if self.factors.is_empty() {
            return Err(CoreError::Validation(
                "factors must contain at least one label".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
