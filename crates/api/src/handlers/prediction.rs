//! Handlers for churn risk predictions.
//!
//! Routes:
//! - `POST /predictions/generate` — run the write-once generation gate
//! - `GET  /predictions`          — crew-joined predictions with dashboard figures
//! - `GET  /predictions/status`   — classify the current generation state

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use crewrisk_core::dashboard::build_dashboard;
use crewrisk_core::generation::{GenerationState, Outcome};
use crewrisk_core::types::Timestamp;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of a successful generation.
#[derive(Debug, Serialize)]
pub struct GenerationSummary {
    pub count: usize,
    pub generated_at: Timestamp,
}

/// POST /api/v1/predictions/generate
///
/// The run is spawned onto its own task: once started it completes even if
/// the client disconnects or the request times out.
pub async fn generate(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let gate = state.generation.clone();
    let outcome = tokio::spawn(async move { gate.run_generation().await })
        .await
        .map_err(|e| AppError::InternalError(format!("generation task aborted: {e}")))?;

    match outcome {
        Outcome::Succeeded {
            count,
            generated_at,
        } => Ok((
            StatusCode::CREATED,
            Json(DataResponse {
                data: GenerationSummary {
                    count,
                    generated_at,
                },
            }),
        )),
        Outcome::Rejected(rejection) => Err(AppError::Rejected(rejection)),
        Outcome::Failed(err) => Err(AppError::Generation(err)),
    }
}

/// GET /api/v1/predictions
pub async fn list_predictions(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let store = state.generation.store();
    let predictions = store.list_predictions().await?;
    let crew = store.fetch_sources().await?;

    Ok(Json(DataResponse {
        data: build_dashboard(predictions, &crew),
    }))
}

/// GET /api/v1/predictions/status
pub async fn generation_status(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let status: GenerationState = state.generation.inspect_generation().await?;
    if matches!(
        status,
        GenerationState::Partial { .. } | GenerationState::Inconsistent { .. }
    ) {
        tracing::warn!(?status, "Prediction table holds an incomplete generation");
    }
    Ok(Json(DataResponse { data: status }))
}
