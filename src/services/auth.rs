//! Admin authentication service

use chrono::{DateTime, Duration, Utc};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::session::AdminClaims,
};

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Check admin credentials and issue a session token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, DateTime<Utc>)> {
        if username != self.config.admin_username || password != self.config.admin_password {
            tracing::warn!(username = %username, "Rejected admin login");
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let now = Utc::now();
        let expires_at = i64::try_from(self.config.token_ttl_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "auth.token_ttl_hours out of range: {}",
                    self.config.token_ttl_hours
                ))
            })?;
        let claims = AdminClaims {
            sub: username.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!(username = %username, "Admin logged in");
        Ok((token, expires_at))
    }

    /// Verify a session token issued by [`AuthService::login`]
    pub fn verify(&self, token: &str) -> AppResult<AdminClaims> {
        AdminClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))
    }
}
