//! The record store seam.
//!
//! The gate talks to persistence only through [`RecordStore`]. Errors are
//! classified by the implementation, so callers never inspect message text
//! to tell a uniqueness violation from any other failure.

use async_trait::async_trait;

use crate::records::{CrewRecord, PredictionResult};
use crate::types::Timestamp;

/// Failure reported by a [`RecordStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The write collided with an existing row under a uniqueness constraint.
    #[error("Unique constraint violated: {}", .constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },

    /// Any other backend failure, with the backend's own description.
    #[error("Store error: {0}")]
    Other(String),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}

/// Persistence operations needed by the generation gate and its read views.
///
/// Implementations must be shareable across requests (`Send + Sync`) and must
/// enforce uniqueness of `subject_id` in the prediction table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Cheap probe: does the prediction table hold at least one row?
    async fn predictions_exist(&self) -> Result<bool, StoreError>;

    /// All crew records, ordered by id.
    async fn fetch_sources(&self) -> Result<Vec<CrewRecord>, StoreError>;

    /// Insert the whole batch as one atomic operation. Returns rows written.
    async fn insert_predictions(&self, batch: &[PredictionResult]) -> Result<u64, StoreError>;

    async fn count_predictions(&self) -> Result<u64, StoreError>;

    /// Prediction rows stamped with exactly `generated_at`.
    async fn count_predictions_at(&self, generated_at: Timestamp) -> Result<u64, StoreError>;

    /// Crew records created at or before `at`.
    async fn count_sources_at(&self, at: Timestamp) -> Result<u64, StoreError>;

    /// Distinct `generated_at` values present in the prediction table, oldest first.
    async fn batch_timestamps(&self) -> Result<Vec<Timestamp>, StoreError>;

    /// All predictions, highest score first.
    async fn list_predictions(&self) -> Result<Vec<PredictionResult>, StoreError>;
}
