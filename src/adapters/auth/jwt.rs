//! JWT implementation of SessionValidator.
//!
//! Validates HS256 bearer tokens carrying the subject id and role claim.
//! Signing lives next to validation so tests and the login flow issue
//! tokens through the same code that checks them.

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{AuthError, AuthPrincipal, Role};
use crate::ports::SessionValidator;

/// Token claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject account id.
    sub: Uuid,

    /// Role tag selecting the account store.
    role: Role,

    /// Expiry, seconds since epoch.
    exp: u64,
}

/// HS256 JWT validator.
pub struct JwtSessionValidator {
    secret: SecretString,
}

impl JwtSessionValidator {
    /// Creates a validator with the given signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    /// Issue a signed token for a principal, valid for `ttl_secs`.
    pub fn issue(&self, principal: &AuthPrincipal, ttl_secs: u64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: principal.subject,
            role: principal.role,
            exp: now_secs() + ttl_secs,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| AuthError::service_unavailable(e.to_string()))
    }
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthPrincipal, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        Ok(AuthPrincipal::new(data.claims.sub, data.claims.role))
    }
}
