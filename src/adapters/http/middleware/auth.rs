//! Authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `auth_middleware` - validates Bearer tokens and injects the resolved
//!   identity into request extensions
//! - `RequireIdentity` - extractor that requires an authenticated caller
//!
//! # Architecture
//!
//! Token validation goes through the `SessionValidator` port and account
//! resolution through the `IdentityResolver` port, so the middleware never
//! changes when the token issuer or the store does. Resolution is one
//! role-tagged lookup; the middleware never probes account stores in
//! sequence.
//!
//! ```text
//! Request → auth_middleware → injects Identity into extensions
//!                                      ↓
//!                              Handler → RequireIdentity reads extensions
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, Identity};
use crate::ports::{IdentityResolver, SessionValidator};

use super::super::error::ErrorResponse;

/// Auth middleware state: token validation + identity resolution.
#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn SessionValidator>,
    pub resolver: Arc<dyn IdentityResolver>,
}

/// Authentication middleware that validates Bearer tokens.
///
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates it via the `SessionValidator` port
/// 3. Resolves the principal via the `IdentityResolver` port
/// 4. On success, injects [`Identity`] into request extensions
/// 5. On missing token, continues without injecting (handlers enforce
///    authentication with `RequireIdentity`)
/// 6. On invalid token or vanished account, returns 401
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        // No token provided - continue unauthenticated.
        return next.run(request).await;
    };

    let principal = match auth.validator.validate(token).await {
        Ok(principal) => principal,
        Err(e) => {
            let (status, message) = match &e {
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
                AuthError::ServiceUnavailable(msg) => {
                    tracing::error!("Auth service unavailable: {}", msg);
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Authentication service unavailable",
                    )
                }
                _ => (StatusCode::UNAUTHORIZED, "Authentication failed"),
            };
            return (status, Json(ErrorResponse::new("AUTH_ERROR", message))).into_response();
        }
    };

    match auth.resolver.resolve(&principal).await {
        Ok(Some(identity)) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Ok(None) => {
            // Valid token, vanished account: force re-authentication.
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("AUTH_ERROR", "Account not found")),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "identity resolution failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("INTERNAL_ERROR", "Internal server error")),
            )
                .into_response()
        }
    }
}

/// Extractor that requires an authenticated caller.
///
/// Returns 401 if the auth middleware did not inject an identity.
#[derive(Debug, Clone)]
pub struct RequireIdentity(pub Identity);

/// Rejection for missing authentication.
#[derive(Debug)]
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "AUTHENTICATION_REQUIRED",
                "Authentication is required",
            )),
        )
            .into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<Identity>()
                .cloned()
                .map(RequireIdentity)
                .ok_or(AuthenticationRequired)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::StudentId;
    use axum::http::Request as HttpRequest;

    #[tokio::test]
    async fn require_identity_rejects_without_extension() {
        let request = HttpRequest::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        let result =
            <RequireIdentity as axum::extract::FromRequestParts<()>>::from_request_parts(
                &mut parts,
                &(),
            )
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn require_identity_reads_injected_identity() {
        let identity = Identity::Student(StudentId::new());
        let mut builder = HttpRequest::builder().body(()).unwrap();
        builder.extensions_mut().insert(identity.clone());
        let (mut parts, _) = builder.into_parts();

        let result =
            <RequireIdentity as axum::extract::FromRequestParts<()>>::from_request_parts(
                &mut parts,
                &(),
            )
            .await;

        assert_eq!(result.unwrap().0, identity);
    }

    #[test]
    fn rejection_is_401() {
        let response = AuthenticationRequired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
