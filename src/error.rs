//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message shared by every credential failure so callers cannot tell an unknown email from a wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("no row store configured: set SUPABASE_URL and SUPABASE_KEY, or DATABASE_URL")]
    NoStore,
}

/// Failures reported by a row store backend. The display text is passed through to clients as `error`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Postgres(#[from] sqlx::Error),
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected store response: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{}", INVALID_CREDENTIALS)]
    Authentication,
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Upstream(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::InvalidInput(_) => (
                StatusCode::BAD_REQUEST,
                ErrorBody { message: self.to_string(), error: None },
            ),
            AppError::Authentication => (
                StatusCode::UNAUTHORIZED,
                ErrorBody { message: self.to_string(), error: None },
            ),
            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorBody { message: self.to_string(), error: None },
            ),
            AppError::Upstream(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: "Server error".into(),
                        error: Some(self.to_string()),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_carry_only_message() {
        let (status, body) = body_json(AppError::InvalidInput("Invalid table name".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "message": "Invalid table name" }));

        let (status, body) = body_json(AppError::Authentication).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({ "message": INVALID_CREDENTIALS }));
    }

    #[tokio::test]
    async fn upstream_errors_pass_detail_through() {
        let err = AppError::from(StoreError::Rejected {
            status: 503,
            message: "relation \"users\" does not exist".into(),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Server error");
        assert_eq!(body["error"], "relation \"users\" does not exist");
    }
}
