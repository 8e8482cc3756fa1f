use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crewrisk_core::generation::{GenerationError, Rejection};
use crewrisk_core::store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Generation rejections travel through here as well so that every non-2xx
/// answer shares the `{ "error", "code" }` body. Rejections map to 4xx;
/// dependency failures map to 5xx and carry their full detail.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The gate refused to generate.
    #[error("Rejected: {}", .0.reason())]
    Rejected(Rejection),

    /// A dependency failed during generation.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A store failure outside generation (listing, status).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- Rejections ---
            AppError::Rejected(rejection) => {
                let status = match rejection {
                    Rejection::AlreadyExists | Rejection::DuplicateAtWrite => StatusCode::CONFLICT,
                    Rejection::NoSourceData => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, rejection.code(), rejection.reason().to_string())
            }

            // --- Generation failures ---
            AppError::Generation(err) => {
                let status = match err {
                    GenerationError::Scorer { .. } => StatusCode::BAD_GATEWAY,
                    GenerationError::Store(_) | GenerationError::PartialWrite { .. } => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.code(), err.to_string())
            }

            // --- Store errors ---
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_FAILURE",
                    err.to_string(),
                )
            }

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
