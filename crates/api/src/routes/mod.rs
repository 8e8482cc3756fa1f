pub mod health;
pub mod prediction;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /predictions    generation gate, listing, status
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/predictions", prediction::router())
}
