//! Session validation port.
//!
//! Validates a bearer token and extracts the caller's claims. Keeps the
//! HTTP middleware issuer-agnostic: the JWT adapter, or a mock in tests,
//! both satisfy this contract.

use crate::domain::foundation::{AuthError, AuthPrincipal};
use async_trait::async_trait;

/// Port for validating bearer tokens.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a token and return the principal it carries.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` for malformed tokens or bad signatures
    /// - `TokenExpired` for expired tokens
    /// - `ServiceUnavailable` when the validation backend is down
    async fn validate(&self, token: &str) -> Result<AuthPrincipal, AuthError>;
}
