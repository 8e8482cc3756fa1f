//! Write-once generation gate.
//!
//! [`GenerationOrchestrator::run_generation`] persists at most one batch of
//! predictions per dataset generation:
//!
//! 1. probe the prediction table and reject if anything is there;
//! 2. fetch every crew record and reject if there are none;
//! 3. score the records concurrently, preserving input order;
//! 4. stamp the whole batch with one `generated_at`;
//! 5. write the batch with a single bulk insert.
//!
//! Step 1 is best-effort. Two runs that both observe an empty table are
//! separated at step 5 by the store's uniqueness constraint on `subject_id`,
//! and the losing run is reported as a rejection rather than a failure.
//! Nothing here retries.

use std::sync::Arc;

use chrono::SubsecRound;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;

use crate::records::{CrewRecord, PredictionResult};
use crate::scoring::{Scorer, ScorerError};
use crate::store::{RecordStore, StoreError};
use crate::types::{SubjectId, Timestamp};

/// Default number of scorer calls in flight at once.
pub const DEFAULT_SCORING_CONCURRENCY: usize = 16;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Expected refusal to generate. Not an error; the caller decides what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The pre-check found existing predictions.
    AlreadyExists,
    /// The crew table is empty.
    NoSourceData,
    /// The bulk insert hit the uniqueness constraint.
    DuplicateAtWrite,
}

impl Rejection {
    pub fn reason(self) -> &'static str {
        match self {
            Rejection::AlreadyExists => {
                "generation already exists; clear old predictions before generating again"
            }
            Rejection::NoSourceData => "no source data: the crew table is empty",
            Rejection::DuplicateAtWrite => "duplicate detected at write time",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Rejection::AlreadyExists => "ALREADY_EXISTS",
            Rejection::NoSourceData => "NO_SOURCE_DATA",
            Rejection::DuplicateAtWrite => "DUPLICATE_AT_WRITE",
        }
    }
}

/// Unexpected fault in a dependency during generation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("Scorer failed for crew {subject_id}: {source}")]
    Scorer {
        subject_id: SubjectId,
        #[source]
        source: ScorerError,
    },

    #[error(transparent)]
    Store(StoreError),

    /// The insert failed, yet rows are present afterwards. The table must be
    /// inspected and cleared by an operator before generating again.
    #[error("Bulk insert failed but {rows} prediction rows are present; manual cleanup required: {source}")]
    PartialWrite {
        rows: u64,
        #[source]
        source: StoreError,
    },
}

impl GenerationError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::Scorer { .. } => "SCORER_FAILURE",
            GenerationError::Store(_) => "STORE_FAILURE",
            GenerationError::PartialWrite { .. } => "PARTIAL_WRITE",
        }
    }
}

/// Result of one [`GenerationOrchestrator::run_generation`] call.
#[derive(Debug, Clone)]
pub enum Outcome {
    Succeeded {
        count: usize,
        generated_at: Timestamp,
    },
    Rejected(Rejection),
    Failed(GenerationError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }
}

// ---------------------------------------------------------------------------
// Generation state
// ---------------------------------------------------------------------------

/// What the prediction table currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GenerationState {
    Empty,
    Complete {
        rows: u64,
        generated_at: Timestamp,
    },
    /// One batch timestamp, but fewer rows than crew records that existed
    /// when the batch was stamped.
    Partial {
        rows: u64,
        expected: u64,
    },
    /// More than one batch timestamp present.
    Inconsistent {
        batches: usize,
    },
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives the check, fetch, score, persist sequence against injected seams.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    store: Arc<dyn RecordStore>,
    scorer: Arc<dyn Scorer>,
    scoring_concurrency: usize,
}

impl GenerationOrchestrator {
    pub fn new(store: Arc<dyn RecordStore>, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            store,
            scorer,
            scoring_concurrency: DEFAULT_SCORING_CONCURRENCY,
        }
    }

    /// Cap concurrent scorer calls. Values below 1 are treated as 1.
    pub fn with_scoring_concurrency(mut self, limit: usize) -> Self {
        self.scoring_concurrency = limit.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Run one generation attempt. Every path is logged; none retries.
    pub async fn run_generation(&self) -> Outcome {
        match self.predictions_exist().await {
            Ok(true) => {
                tracing::info!("Predictions already present, rejecting generation");
                return Outcome::Rejected(Rejection::AlreadyExists);
            }
            Ok(false) => {}
            Err(err) => return fail(err),
        }

        let sources = match self.store.fetch_sources().await {
            Ok(sources) => sources,
            Err(err) => return fail(GenerationError::Store(err)),
        };
        if sources.is_empty() {
            tracing::info!("Crew table is empty, rejecting generation");
            return Outcome::Rejected(Rejection::NoSourceData);
        }
        tracing::debug!(sources = sources.len(), "Fetched crew records");

        // Microsecond precision, as stored by `timestamptz`.
        let generated_at = chrono::Utc::now().trunc_subsecs(6);
        let batch = match self.score_batch(&sources, generated_at).await {
            Ok(batch) => batch,
            Err(err) => return fail(err),
        };

        self.persist(batch, generated_at).await
    }

    /// Classify the prediction table as empty, complete, partial, or inconsistent.
    pub async fn inspect_generation(&self) -> Result<GenerationState, StoreError> {
        let rows = self.store.count_predictions().await?;
        if rows == 0 {
            return Ok(GenerationState::Empty);
        }

        let batches = self.store.batch_timestamps().await?;
        let [generated_at] = batches.as_slice() else {
            return Ok(GenerationState::Inconsistent {
                batches: batches.len(),
            });
        };

        let expected = self.store.count_sources_at(*generated_at).await?;
        if rows < expected {
            Ok(GenerationState::Partial { rows, expected })
        } else {
            Ok(GenerationState::Complete {
                rows,
                generated_at: *generated_at,
            })
        }
    }

    async fn predictions_exist(&self) -> Result<bool, GenerationError> {
        self.store
            .predictions_exist()
            .await
            .map_err(GenerationError::Store)
    }

    /// Score every record and assemble the batch in input order.
    async fn score_batch(
        &self,
        sources: &[CrewRecord],
        generated_at: Timestamp,
    ) -> Result<Vec<PredictionResult>, GenerationError> {
        let scorer = &self.scorer;
        let scoring: Vec<_> = sources
            .iter()
            .map(|record| async move {
                let assessment = scorer.score(record).await.map_err(|source| {
                    GenerationError::Scorer {
                        subject_id: record.id,
                        source,
                    }
                })?;
                assessment
                    .validate()
                    .map_err(|e| GenerationError::Scorer {
                        subject_id: record.id,
                        source: ScorerError::from(e),
                    })?;
                Ok::<_, GenerationError>(PredictionResult::from_assessment(
                    record.id,
                    assessment,
                    generated_at,
                ))
            })
            .collect();
        stream::iter(scoring)
            .buffered(self.scoring_concurrency)
            .try_collect()
            .await
    }

    async fn persist(&self, batch: Vec<PredictionResult>, generated_at: Timestamp) -> Outcome {
        let count = batch.len();
        tracing::info!(count, %generated_at, "Persisting prediction batch");

        match self.store.insert_predictions(&batch).await {
            Ok(written) => {
                if written != count as u64 {
                    tracing::warn!(count, written, "Store reported unexpected row count");
                }
                tracing::info!(count, "Prediction batch persisted");
                Outcome::Succeeded {
                    count,
                    generated_at,
                }
            }
            Err(err) if err.is_unique_violation() => {
                tracing::warn!(error = %err, "Duplicate detected at write time");
                Outcome::Rejected(Rejection::DuplicateAtWrite)
            }
            Err(err) => fail(self.classify_write_failure(err, generated_at).await),
        }
    }

    /// After a non-uniqueness insert failure, look again: rows carrying this
    /// run's `generated_at` mean the batch was partially applied. Rows from
    /// any other batch belong to another run and leave this one a plain
    /// store failure.
    async fn classify_write_failure(
        &self,
        err: StoreError,
        generated_at: Timestamp,
    ) -> GenerationError {
        match self.store.count_predictions_at(generated_at).await {
            Ok(0) => GenerationError::Store(err),
            Ok(rows) => GenerationError::PartialWrite { rows, source: err },
            Err(recheck) => {
                tracing::error!(error = %recheck, "Post-failure existence re-check failed");
                GenerationError::Store(err)
            }
        }
    }
}

fn fail(err: GenerationError) -> Outcome {
    tracing::error!(error = %err, code = err.code(), "Generation failed");
    Outcome::Failed(err)
}
