//! crewrisk test utilities
//!
//! - [`InMemoryStore`]: a [`RecordStore`] with the same uniqueness rule as the
//!   PostgreSQL schema, plus hooks for forcing races and insert failures
//! - scripted [`Scorer`]s: fixed, failing, and inconsistent
//! - crew and prediction fixtures

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Barrier;

pub use crewrisk_core::generation::{GenerationOrchestrator, GenerationState, Outcome, Rejection};
pub use crewrisk_core::records::{CrewRecord, PredictionResult};
pub use crewrisk_core::risk::{RiskAssessment, RiskLevel, RiskScore};
pub use crewrisk_core::scoring::{Scorer, ScorerError};
pub use crewrisk_core::store::{RecordStore, StoreError};
pub use crewrisk_core::types::Timestamp;

/// Constraint name reported by [`InMemoryStore`] on duplicate subjects,
/// matching the PostgreSQL migration.
pub const UNIQUE_SUBJECT_CONSTRAINT: &str = "uq_churn_predictions_subject_id";

// ============================================================================
// FIXTURES
// ============================================================================

/// `n` active crew records with fresh ids, hired an hour ago, no outlet.
pub fn crew(n: usize) -> Vec<CrewRecord> {
    let hired = Utc::now() - Duration::hours(1);
    (0..n)
        .map(|i| CrewRecord {
            id: uuid::Uuid::new_v4(),
            full_name: format!("Crew {i}"),
            role: "crew".to_string(),
            is_active: true,
            outlet: None,
            created_at: hired,
        })
        .collect()
}

/// One active crew member at `outlet`, created now.
pub fn hire(full_name: &str, outlet: Option<&str>) -> CrewRecord {
    CrewRecord {
        id: uuid::Uuid::new_v4(),
        full_name: full_name.to_string(),
        role: "crew".to_string(),
        is_active: true,
        outlet: outlet.map(str::to_string),
        created_at: Utc::now(),
    }
}

/// A prediction for `subject` with the given score, stamped `generated_at`.
pub fn prediction(subject: &CrewRecord, score: i32, generated_at: Timestamp) -> PredictionResult {
    let score = RiskScore::new(score).expect("fixture score out of range");
    PredictionResult::from_assessment(subject.id, RiskAssessment::from_score(score), generated_at)
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// How [`InMemoryStore::insert_predictions`] should misbehave.
#[derive(Debug, Clone)]
pub enum InsertFailure {
    /// Fail with [`StoreError::Other`] before writing anything.
    Other(String),
    /// Apply the first `applied` rows, then fail with [`StoreError::Other`].
    PartialThenOther { applied: usize, message: String },
}

#[derive(Debug, Default)]
struct State {
    sources: Vec<CrewRecord>,
    predictions: Vec<PredictionResult>,
    insert_calls: usize,
    /// Rows another run commits right after the next existence probe.
    concurrent_batch: Option<Vec<PredictionResult>>,
}

/// Mutex-backed store. A bulk insert checks every subject against existing
/// rows and within the batch before writing any of them, under one lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    probe_barrier: Option<Arc<Barrier>>,
    insert_failure: Option<InsertFailure>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(self, sources: Vec<CrewRecord>) -> Self {
        self.lock().sources = sources;
        self
    }

    pub fn with_predictions(self, predictions: Vec<PredictionResult>) -> Self {
        self.lock().predictions = predictions;
        self
    }

    /// Commit `rows` on behalf of another run immediately after the next
    /// existence probe has reported an empty table.
    pub fn with_concurrent_batch(self, rows: Vec<PredictionResult>) -> Self {
        self.lock().concurrent_batch = Some(rows);
        self
    }

    /// Add a crew record after construction, e.g. a hire after generation.
    pub fn add_source(&self, record: CrewRecord) {
        self.lock().sources.push(record);
    }

    /// Make every existence probe wait on `barrier` after reading, so
    /// concurrent runs all observe the same (empty) table.
    pub fn with_probe_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.probe_barrier = Some(barrier);
        self
    }

    pub fn with_insert_failure(mut self, failure: InsertFailure) -> Self {
        self.insert_failure = Some(failure);
        self
    }

    pub fn predictions(&self) -> Vec<PredictionResult> {
        self.lock().predictions.clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.lock().insert_calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("in-memory store mutex poisoned")
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn predictions_exist(&self) -> Result<bool, StoreError> {
        let exists = {
            let mut state = self.lock();
            let exists = !state.predictions.is_empty();
            if let Some(rows) = state.concurrent_batch.take() {
                state.predictions.extend(rows);
            }
            exists
        };
        if let Some(barrier) = &self.probe_barrier {
            barrier.wait().await;
        }
        Ok(exists)
    }

    async fn fetch_sources(&self) -> Result<Vec<CrewRecord>, StoreError> {
        let mut sources = self.lock().sources.clone();
        sources.sort_by_key(|c| c.id);
        Ok(sources)
    }

    async fn insert_predictions(&self, batch: &[PredictionResult]) -> Result<u64, StoreError> {
        let mut state = self.lock();
        state.insert_calls += 1;

        match &self.insert_failure {
            Some(InsertFailure::Other(message)) => return Err(StoreError::Other(message.clone())),
            Some(InsertFailure::PartialThenOther { applied, message }) => {
                let applied = (*applied).min(batch.len());
                state.predictions.extend_from_slice(&batch[..applied]);
                return Err(StoreError::Other(message.clone()));
            }
            None => {}
        }

        let mut seen: Vec<_> = state.predictions.iter().map(|p| p.subject_id).collect();
        for row in batch {
            if seen.contains(&row.subject_id) {
                return Err(StoreError::UniqueViolation {
                    constraint: Some(UNIQUE_SUBJECT_CONSTRAINT.to_string()),
                });
            }
            seen.push(row.subject_id);
        }

        state.predictions.extend_from_slice(batch);
        Ok(batch.len() as u64)
    }

    async fn count_predictions(&self) -> Result<u64, StoreError> {
        Ok(self.lock().predictions.len() as u64)
    }

    async fn count_predictions_at(&self, generated_at: Timestamp) -> Result<u64, StoreError> {
        let state = self.lock();
        let rows = state
            .predictions
            .iter()
            .filter(|p| p.generated_at == generated_at)
            .count();
        Ok(rows as u64)
    }

    async fn count_sources_at(&self, at: Timestamp) -> Result<u64, StoreError> {
        let state = self.lock();
        let rows = state.sources.iter().filter(|c| c.created_at <= at).count();
        Ok(rows as u64)
    }

    async fn batch_timestamps(&self) -> Result<Vec<Timestamp>, StoreError> {
        let mut stamps: Vec<_> = self.lock().predictions.iter().map(|p| p.generated_at).collect();
        stamps.sort();
        stamps.dedup();
        Ok(stamps)
    }

    async fn list_predictions(&self) -> Result<Vec<PredictionResult>, StoreError> {
        let mut rows = self.lock().predictions.clone();
        rows.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
        Ok(rows)
    }
}

// ============================================================================
// SCRIPTED SCORERS
// ============================================================================

/// Returns the same well-formed assessment for every record.
#[derive(Debug, Clone)]
pub struct FixedScorer {
    score: RiskScore,
}

impl FixedScorer {
    pub fn new(score: i32) -> Self {
        Self {
            score: RiskScore::new(score).expect("fixed scorer score out of range"),
        }
    }
}

#[async_trait]
impl Scorer for FixedScorer {
    async fn score(&self, _record: &CrewRecord) -> Result<RiskAssessment, ScorerError> {
        Ok(RiskAssessment::from_score(self.score))
    }
}

/// Always reports the scorer as unavailable.
#[derive(Debug, Clone, Default)]
pub struct FailingScorer;

#[async_trait]
impl Scorer for FailingScorer {
    async fn score(&self, _record: &CrewRecord) -> Result<RiskAssessment, ScorerError> {
        Err(ScorerError::Unavailable("model endpoint unreachable".to_string()))
    }
}

/// Returns a `High` score labelled `Low`.
#[derive(Debug, Clone, Default)]
pub struct MislabelledScorer;

#[async_trait]
impl Scorer for MislabelledScorer {
    async fn score(&self, _record: &CrewRecord) -> Result<RiskAssessment, ScorerError> {
        let mut assessment =
            RiskAssessment::from_score(RiskScore::new(90).expect("90 is a valid score"));
        assessment.level = RiskLevel::Low;
        Ok(assessment)
    }
}
