//! Response bodies shared by handlers.

use crate::transform::UserView;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionStatus {
    pub fn ok() -> Self {
        ConnectionStatus {
            success: true,
            message: "Database connection successful",
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        ConnectionStatus {
            success: false,
            message: "Error connecting to database",
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserView,
    pub message: &'static str,
}

/// Body for a successful `delete` action.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
    pub id: Value,
}
