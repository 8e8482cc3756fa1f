use crewrisk_core::generation::GenerationOrchestrator;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool and orchestrator are handles over shared data.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health checks).
    pub pool: crewrisk_db::DbPool,
    /// Write-once generation gate, holding the injected store and scorer.
    pub generation: GenerationOrchestrator,
}
