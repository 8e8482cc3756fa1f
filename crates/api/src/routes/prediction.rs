//! Route definitions for churn risk predictions.
//!
//! ```text
//! GET    /                 list_predictions
//! POST   /generate         generate
//! GET    /status           generation_status
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::prediction;
use crate::state::AppState;

/// Routes mounted at `/predictions`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(prediction::list_predictions))
        .route("/generate", post(prediction::generate))
        .route("/status", get(prediction::generation_status))
}
