//! Admin dashboard views over a persisted batch.
//!
//! Predictions are joined to their crew records in memory, then summarised:
//! headline figures, average risk per outlet, and a short watchlist of the
//! highest `High` scores.

use std::collections::HashMap;

use serde::Serialize;

use crate::records::{CrewRecord, PredictionResult};
use crate::risk::{RiskLevel, RiskScore};
use crate::types::{SubjectId, Timestamp};

/// Outlet name for crew with no outlet assigned.
pub const DEFAULT_OUTLET: &str = "Main outlet";

/// Name shown for a prediction whose crew record is gone.
pub const UNKNOWN_CREW_NAME: &str = "Unknown crew";

/// Role shown for a prediction whose crew record is gone.
pub const UNKNOWN_CREW_ROLE: &str = "crew";

/// Entries in [`Dashboard::watchlist`].
pub const WATCHLIST_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A prediction joined to the crew member it scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewPrediction {
    pub subject_id: SubjectId,
    pub full_name: String,
    pub role: String,
    pub outlet: String,
    pub risk_score: RiskScore,
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
    pub generated_at: Timestamp,
}

/// Headline figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    /// Active crew; every crew record when none is flagged active.
    pub total: usize,
    /// Predictions at level `High`.
    pub high_risk: usize,
    /// Mean prediction score, one decimal place. `0.0` without predictions.
    pub average_score: f64,
}

/// Average risk for one outlet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutletRisk {
    pub name: String,
    /// Mean score, rounded to the nearest integer.
    pub avg_risk: u8,
    pub count: usize,
}

/// Everything `GET /predictions` returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub summary: RiskSummary,
    /// Highest average first.
    pub outlets: Vec<OutletRisk>,
    /// Up to [`WATCHLIST_LEN`] `High` predictions, highest score first.
    pub watchlist: Vec<CrewPrediction>,
    /// Every prediction, in the order given.
    pub items: Vec<CrewPrediction>,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Join each prediction to its crew record, keeping prediction order.
pub fn join_crew(predictions: Vec<PredictionResult>, crew: &[CrewRecord]) -> Vec<CrewPrediction> {
    let by_id: HashMap<SubjectId, &CrewRecord> = crew.iter().map(|c| (c.id, c)).collect();

    predictions
        .into_iter()
        .map(|p| {
            let record = by_id.get(&p.subject_id);
            CrewPrediction {
                subject_id: p.subject_id,
                full_name: record
                    .map(|c| c.full_name.clone())
                    .unwrap_or_else(|| UNKNOWN_CREW_NAME.to_string()),
                role: record
                    .map(|c| c.role.clone())
                    .unwrap_or_else(|| UNKNOWN_CREW_ROLE.to_string()),
                outlet: record
                    .and_then(|c| c.outlet.clone())
                    .unwrap_or_else(|| DEFAULT_OUTLET.to_string()),
                risk_score: p.risk_score,
                risk_level: p.risk_level,
                factors: p.factors,
                generated_at: p.generated_at,
            }
        })
        .collect()
}

/// Headline figures for a batch and the current crew table.
pub fn summarize(predictions: &[PredictionResult], crew: &[CrewRecord]) -> RiskSummary {
    let active = crew.iter().filter(|c| c.is_active).count();
    let total = if active == 0 { crew.len() } else { active };

    let high_risk = predictions
        .iter()
        .filter(|p| RiskLevel::from_score(p.risk_score) == RiskLevel::High)
        .count();

    let average_score = if predictions.is_empty() {
        0.0
    } else {
        let sum: u32 = predictions
            .iter()
            .map(|p| u32::from(p.risk_score.value()))
            .sum();
        let mean = f64::from(sum) / predictions.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    RiskSummary {
        total,
        high_risk,
        average_score,
    }
}

/// Average score per outlet, highest first; ties ordered by name.
pub fn outlet_risks(items: &[CrewPrediction]) -> Vec<OutletRisk> {
    let mut totals: HashMap<&str, (u32, usize)> = HashMap::new();
    for item in items {
        let entry = totals.entry(item.outlet.as_str()).or_insert((0, 0));
        entry.0 += u32::from(item.risk_score.value());
        entry.1 += 1;
    }

    let mut outlets: Vec<OutletRisk> = totals
        .into_iter()
        .map(|(name, (sum, count))| OutletRisk {
            name: name.to_string(),
            avg_risk: (f64::from(sum) / count as f64).round() as u8,
            count,
        })
        .collect();
    outlets.sort_by(|a, b| {
        b.avg_risk
            .cmp(&a.avg_risk)
            .then_with(|| a.name.cmp(&b.name))
    });
    outlets
}

/// Build the full dashboard. `predictions` should arrive highest score first.
pub fn build_dashboard(predictions: Vec<PredictionResult>, crew: &[CrewRecord]) -> Dashboard {
    let summary = summarize(&predictions, crew);
    let items = join_crew(predictions, crew);
    let outlets = outlet_risks(&items);
    let watchlist = items
        .iter()
        .filter(|i| i.risk_level == RiskLevel::High)
        .take(WATCHLIST_LEN)
        .cloned()
        .collect();

    Dashboard {
        summary,
        outlets,
        watchlist,
        items,
    }
}
