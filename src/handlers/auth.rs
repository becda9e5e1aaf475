use crate::error::AppError;
use crate::extractors::ApiJson;
use crate::response::LoginResponse;
use crate::service::AuthService;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let present = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(email), Some(password)) = (present(body.email), present(body.password)) else {
        return Err(AppError::InvalidInput("Email and password are required".into()));
    };
    let user = AuthService::login(state.store.as_ref(), &state.passwords, &email, &password).await?;
    tracing::info!(user_id = %user.id, "login succeeded");
    Ok(Json(LoginResponse {
        user,
        message: "Login successful",
    }))
}
