//! Admin login endpoint

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, AppState};

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    /// JWT to send as `Authorization: Bearer <token>`
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Open an admin session
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, expires_at) = state
        .services
        .auth
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        token_type: "Bearer".to_string(),
        expires_at,
    }))
}
