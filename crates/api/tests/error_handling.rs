//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly; no server or database is involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;

use crewrisk_api::error::AppError;
use crewrisk_core::generation::{GenerationError, Rejection};
use crewrisk_core::scoring::ScorerError;
use crewrisk_core::store::StoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn rejections_are_client_errors_with_reason() {
    let cases = [
        (Rejection::AlreadyExists, StatusCode::CONFLICT, "ALREADY_EXISTS"),
        (Rejection::NoSourceData, StatusCode::UNPROCESSABLE_ENTITY, "NO_SOURCE_DATA"),
        (Rejection::DuplicateAtWrite, StatusCode::CONFLICT, "DUPLICATE_AT_WRITE"),
    ];

    for (rejection, expected_status, expected_code) in cases {
        let (status, json) = error_to_response(AppError::Rejected(rejection)).await;
        assert_eq!(status, expected_status);
        assert!(status.is_client_error());
        assert_eq!(json["code"], expected_code);
        assert_eq!(json["error"], rejection.reason());
    }
}

#[tokio::test]
async fn duplicate_at_write_reason_is_explicit() {
    let (_, json) = error_to_response(AppError::Rejected(Rejection::DuplicateAtWrite)).await;
    assert_eq!(json["error"], "duplicate detected at write time");
}

#[tokio::test]
async fn store_failure_during_generation_is_server_error() {
    let err = AppError::Generation(GenerationError::Store(StoreError::Other(
        "relation \"churn_predictions\" does not exist".into(),
    )));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "STORE_FAILURE");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("churn_predictions"));
}

#[tokio::test]
async fn partial_write_names_row_count() {
    let err = AppError::Generation(GenerationError::PartialWrite {
        rows: 7,
        source: StoreError::Other("broken pipe".into()),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "PARTIAL_WRITE");
    assert!(json["error"].as_str().unwrap().contains("7 prediction rows"));
}

#[tokio::test]
async fn scorer_failure_is_bad_gateway() {
    let err = AppError::Generation(GenerationError::Scorer {
        subject_id: uuid::Uuid::nil(),
        source: ScorerError::Unavailable("timeout".into()),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "SCORER_FAILURE");
}

#[tokio::test]
async fn internal_error_is_sanitized() {
    let (status, json) =
        error_to_response(AppError::InternalError("secret detail".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
