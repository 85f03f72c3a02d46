//! JWT session tokens

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::principal::Principal;
use crate::domain::Role;
use crate::utils::errors::{ApiError, ApiResult};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // Subject (user id)
    email: String,
    role: Role,
    company_id: String,
    iss: String, // Issuer
    exp: i64,    // Expiration time
    iat: i64,    // Issued at
    jti: String, // JWT ID
}

/// Mints and validates HS256 session tokens.
pub struct JwtAuth {
    secret: String,
    issuer: String,
    default_expiry: Duration,
}

impl JwtAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "mizan".to_string(),
            default_expiry: Duration::hours(24),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_default_expiry(mut self, hours: i64) -> Self {
        self.default_expiry = Duration::hours(hours);
        self
    }

    /// Validate a bearer token and recover the principal it carries.
    pub fn validate_token(&self, token: &str) -> ApiResult<Principal> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::Unauthorized(format!("invalid token: {}", e)))?;

        let claims = token_data.claims;
        Ok(Principal {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            company_id: claims.company_id,
        })
    }

    /// Mint a token for an authenticated principal.
    pub fn generate_token(&self, principal: &Principal) -> ApiResult<Tokens> {
        let now = Utc::now();
        let expires_at = now + self.default_expiry;

        let claims = Claims {
            sub: principal.user_id.clone(),
            email: principal.email.clone(),
            role: principal.role,
            company_id: principal.company_id.clone(),
            iss: self.issuer.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::InternalError(format!("token generation failed: {}", e)))?;

        Ok(Tokens {
            access_token: token,
            expires_in: self.default_expiry.num_seconds(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }
}

/// A minted access token and its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct Tokens {
    pub access_token: String,
    pub expires_in: i64,
}
