#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

use crewrisk_api::config::{LogFormat, ScorerConfig, ServerConfig};
use crewrisk_api::router::build_app_router;
use crewrisk_api::state::AppState;
use crewrisk_core::generation::GenerationOrchestrator;
use crewrisk_core::scoring::Scorer;
use crewrisk_core::store::RecordStore;
use crewrisk_db::{PgRecordStore, PoolSettings};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        database_url: "postgres://crewrisk@127.0.0.1:1/crewrisk".to_string(),
        pool: PoolSettings::default(),
        scorer: ScorerConfig {
            kind: "placeholder".to_string(),
            placeholder_min: 20,
            placeholder_max: 95,
            concurrency: 4,
        },
        log_format: LogFormat::Pretty,
    }
}

/// A pool that never connects until used; pointed at a closed port so
/// health checks fail fast.
pub fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy(&test_config().database_url)
        .unwrap()
}

/// Full router over an arbitrary store and scorer.
pub fn build_app_with(pool: PgPool, store: Arc<dyn RecordStore>, scorer: Arc<dyn Scorer>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        generation: GenerationOrchestrator::new(store, scorer)
            .with_scoring_concurrency(config.scorer.concurrency),
    };
    build_app_router(state, &config)
}

/// Full router backed by PostgreSQL.
pub fn build_test_app(pool: PgPool, scorer: Arc<dyn Scorer>) -> Router {
    let store = Arc::new(PgRecordStore::new(pool.clone()));
    build_app_with(pool, store, scorer)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri).await
}

async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
