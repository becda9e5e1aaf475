//! The `{action, ...payload}` body of `POST /db/:table`.

use crate::error::AppError;
use crate::store::Row;
use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum DbAction {
    GetAll,
    GetById { id: Value },
    Create { data: Row },
    Update { id: Value, data: Row },
    Delete { id: Value },
}

impl DbAction {
    pub const NAMES: [&'static str; 5] = ["getAll", "getById", "create", "update", "delete"];

    /// Missing or unknown `action` is rejected before the payload is looked at.
    pub fn parse(body: Value) -> Result<Self, AppError> {
        let action = body
            .get("action")
            .and_then(Value::as_str)
            .filter(|a| Self::NAMES.contains(a))
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("Invalid action".into()))?;
        serde_json::from_value(body)
            .map_err(|e| AppError::InvalidInput(format!("Invalid payload for {}: {}", action, e)))
    }

    pub fn name(&self) -> &'static str {
        match self {
            DbAction::GetAll => "getAll",
            DbAction::GetById { .. } => "getById",
            DbAction::Create { .. } => "create",
            DbAction::Update { .. } => "update",
            DbAction::Delete { .. } => "delete",
        }
    }
}
