//! Router assembly.

mod api;
mod common;
mod db;

pub use api::api_routes;
pub use common::common_routes;
pub use db::db_routes;

use crate::state::AppState;
use axum::Router;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const BODY_LIMIT: usize = 1024 * 1024;

/// All JSON routes with CORS, tracing and the body limit applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes())
        .merge(api_routes(state.clone()))
        .merge(db_routes(state))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serves files from `dir`; any path without a file gets `dir/index.html` so client-side routes resolve.
pub fn static_assets(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}

/// `app` plus the static fallback for every unmatched route.
pub fn app_with_assets(state: AppState, dir: &Path) -> Router {
    app(state).fallback_service(static_assets(dir))
}
