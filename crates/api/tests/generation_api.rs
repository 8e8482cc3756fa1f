//! HTTP mapping of generation outcomes, exercised against the in-memory store.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, build_app_with, get, post, unreachable_pool};
use crewrisk_test_utils::{
    crew, hire, prediction, FailingScorer, FixedScorer, InMemoryStore, InsertFailure,
};

const GENERATE: &str = "/api/v1/predictions/generate";

fn app(store: &Arc<InMemoryStore>) -> axum::Router {
    build_app_with(unreachable_pool(), store.clone(), Arc::new(FixedScorer::new(75)))
}

// ---------------------------------------------------------------------------
// Test: successful generation returns 201 with count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_returns_created_with_count() {
    let store = Arc::new(InMemoryStore::new().with_sources(crew(4)));

    let response = post(app(&store), GENERATE).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 4);
    assert!(json["data"]["generated_at"].is_string());
    assert_eq!(store.predictions().len(), 4);
}

// ---------------------------------------------------------------------------
// Test: rejections map to 4xx with distinct codes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn existing_generation_returns_conflict() {
    let sources = crew(2);
    let store = Arc::new(
        InMemoryStore::new()
            .with_predictions(vec![prediction(&sources[0], 30, chrono::Utc::now())])
            .with_sources(sources),
    );

    let response = post(app(&store), GENERATE).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "ALREADY_EXISTS");
    assert!(json["error"].as_str().unwrap().contains("already exists"));
    assert_eq!(store.insert_calls(), 0);
}

#[tokio::test]
async fn empty_crew_returns_unprocessable() {
    let store = Arc::new(InMemoryStore::new());

    let response = post(app(&store), GENERATE).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NO_SOURCE_DATA");
    assert!(json["error"].as_str().unwrap().contains("no source data"));
}

#[tokio::test]
async fn second_generate_is_rejected() {
    let store = Arc::new(InMemoryStore::new().with_sources(crew(3)));
    let app = app(&store);

    assert_eq!(post(app.clone(), GENERATE).await.status(), StatusCode::CREATED);
    assert_eq!(post(app, GENERATE).await.status(), StatusCode::CONFLICT);
    assert_eq!(store.predictions().len(), 3);
}

// ---------------------------------------------------------------------------
// Test: failures map to 5xx and are distinguishable from rejections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_failure_returns_500_with_detail() {
    let store = Arc::new(
        InMemoryStore::new()
            .with_sources(crew(2))
            .with_insert_failure(InsertFailure::Other("disk full".into())),
    );

    let response = post(app(&store), GENERATE).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "STORE_FAILURE");
    assert!(json["error"].as_str().unwrap().contains("disk full"));
}

#[tokio::test]
async fn partial_write_returns_500_partial_code() {
    let store = Arc::new(
        InMemoryStore::new()
            .with_sources(crew(4))
            .with_insert_failure(InsertFailure::PartialThenOther {
                applied: 1,
                message: "connection lost".into(),
            }),
    );
    let app = app(&store);

    let response = post(app.clone(), GENERATE).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "PARTIAL_WRITE");

    let status = body_json(get(app, "/api/v1/predictions/status").await).await;
    assert_eq!(status["data"]["state"], "partial");
    assert_eq!(status["data"]["rows"], 1);
    assert_eq!(status["data"]["expected"], 4);
}

#[tokio::test]
async fn scorer_failure_returns_bad_gateway() {
    let store = Arc::new(InMemoryStore::new().with_sources(crew(2)));
    let app = build_app_with(unreachable_pool(), store.clone(), Arc::new(FailingScorer));

    let response = post(app, GENERATE).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "SCORER_FAILURE");
    assert_eq!(store.insert_calls(), 0);
}

// ---------------------------------------------------------------------------
// Test: listing and status views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_crew_joined_items_with_dashboard_figures() {
    let mut sources = vec![
        hire("Ayu", Some("Kemang")),
        hire("Budi", Some("Senopati")),
        hire("Citra", Some("Kemang")),
    ];
    sources[2].is_active = false;
    let now = chrono::Utc::now();
    let store = Arc::new(
        InMemoryStore::new()
            .with_predictions(vec![
                prediction(&sources[0], 20, now),
                prediction(&sources[1], 90, now),
                prediction(&sources[2], 55, now),
            ])
            .with_sources(sources),
    );

    let response = get(app(&store), "/api/v1/predictions").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let scores: Vec<i64> = json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["risk_score"].as_i64().unwrap())
        .collect();
    assert_eq!(scores, vec![90, 55, 20]);
    assert_eq!(json["data"]["items"][0]["risk_level"], "High");
    assert_eq!(json["data"]["items"][0]["full_name"], "Budi");
    assert_eq!(json["data"]["items"][0]["outlet"], "Senopati");
    assert_eq!(json["data"]["summary"]["total"], 2);
    assert_eq!(json["data"]["summary"]["high_risk"], 1);
    assert_eq!(json["data"]["summary"]["average_score"], 55.0);

    let outlets = json["data"]["outlets"].as_array().unwrap();
    assert_eq!(outlets[0]["name"], "Senopati");
    assert_eq!(outlets[0]["avg_risk"], 90);
    assert_eq!(outlets[1]["name"], "Kemang");
    assert_eq!(outlets[1]["avg_risk"], 38);
    assert_eq!(outlets[1]["count"], 2);

    let watchlist = json["data"]["watchlist"].as_array().unwrap();
    assert_eq!(watchlist.len(), 1);
    assert_eq!(watchlist[0]["full_name"], "Budi");
}

#[tokio::test]
async fn status_is_empty_before_generation() {
    let store = Arc::new(InMemoryStore::new().with_sources(crew(1)));

    let json = body_json(get(app(&store), "/api/v1/predictions/status").await).await;

    assert_eq!(json["data"]["state"], "empty");
}

// ---------------------------------------------------------------------------
// Test: banner and health without a database
// ---------------------------------------------------------------------------

#[tokio::test]
async fn index_returns_banner() {
    let store = Arc::new(InMemoryStore::new());

    let response = get(app(&store), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "running");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn health_is_degraded_when_database_unreachable() {
    let store = Arc::new(InMemoryStore::new());

    let json = body_json(get(app(&store), "/health").await).await;

    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
}

// ---------------------------------------------------------------------------
// Test: middleware stack
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let store = Arc::new(InMemoryStore::new());

    let response = get(app(&store), "/").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    let store = Arc::new(InMemoryStore::new());
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri(GENERATE)
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app(&store).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .expect("Missing Access-Control-Allow-Origin header")
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "http://localhost:3000");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let store = Arc::new(InMemoryStore::new());

    let response = get(app(&store), "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
