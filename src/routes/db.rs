use crate::handlers::dispatch;
use crate::state::AppState;
use axum::{routing::post, Router};

/// POST /db/:table with an `{action, ...}` body.
pub fn db_routes(state: AppState) -> Router {
    Router::new()
        .route("/db/:table", post(dispatch))
        .with_state(state)
}
