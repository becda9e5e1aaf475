use crate::error::AppError;
use crate::extractors::ApiJson;
use crate::service::{ActionOutput, DbAction, RecordService};
use crate::state::AppState;
use crate::table::Table;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

/// POST /db/:table. The table is checked before the body, so a bad table is always reported as such.
pub async fn dispatch(
    State(state): State<AppState>,
    Path(table): Path<String>,
    body: Result<ApiJson<Value>, AppError>,
) -> Result<Json<ActionOutput>, AppError> {
    let table: Table = table.parse()?;
    let ApiJson(body) = body?;
    let action = DbAction::parse(body)?;
    let out = RecordService::dispatch(state.store.as_ref(), &state.passwords, table, action).await?;
    Ok(Json(out))
}
