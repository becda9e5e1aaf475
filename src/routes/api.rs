use crate::handlers::{login, test_connection};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// GET /api/test-connection, POST /api/login.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/test-connection", get(test_connection))
        .route("/api/login", post(login))
        .with_state(state)
}
