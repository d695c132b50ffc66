//! Error types for the Momentum Rides server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NotFound = 4,
    FullyBooked = 5,
    BadValue = 6,
    InvalidTransition = 7,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    /// HTTP status and error code for this error
    pub fn status(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::InvalidTransition(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidTransition)
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::FullyBooked),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        let message = match &self {
            AppError::Authentication(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::InvalidTransition(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
