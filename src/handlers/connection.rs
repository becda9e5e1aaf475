use crate::response::ConnectionStatus;
use crate::state::AppState;
use crate::store::SelectQuery;
use crate::table::Table;
use axum::{extract::State, http::StatusCode, Json};

/// GET /api/test-connection: one-row read from users.
pub async fn test_connection(State(state): State<AppState>) -> (StatusCode, Json<ConnectionStatus>) {
    let query = SelectQuery::from(Table::Users).select(&["id"]).limit(1);
    match state.store.select(&query).await {
        Ok(_) => (StatusCode::OK, Json(ConnectionStatus::ok())),
        Err(e) => {
            tracing::error!(error = %e, "database connection test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ConnectionStatus::failed(e.to_string())),
            )
        }
    }
}
