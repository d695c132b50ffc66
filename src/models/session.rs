//! Admin session token claims

use serde::{Deserialize, Serialize};

/// JWT claims carried by an admin session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Admin username
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl AdminClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token (signature and expiry)
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}
