//! Caller identity types for the domain layer.
//!
//! A validated token yields an [`AuthPrincipal`] (id + role claim). The
//! principal is then resolved exactly once, through the role-tagged
//! `IdentityResolver` port, into an [`Identity`] variant. There is no
//! sequential "first collection that has this id wins" probing: the role
//! claim selects the lookup.
//!
//! These types have no provider dependencies; any JWT issuer can populate
//! them via the `SessionValidator` port.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{AdminId, StudentId, TeacherId};

/// Role carried in the token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Returns true for roles that bypass entitlement checks on batches
    /// they administer (admins everywhere, teachers on batches they own).
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Teacher | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        };
        write!(f, "{}", s)
    }
}

/// Claims extracted from a validated token, before identity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPrincipal {
    /// Subject id from the token.
    pub subject: Uuid,

    /// Role claim from the token.
    pub role: Role,
}

impl AuthPrincipal {
    pub fn new(subject: Uuid, role: Role) -> Self {
        Self { subject, role }
    }
}

/// Resolved caller identity, tagged by role.
///
/// Exactly one variant matches a principal; resolution is a single
/// role-keyed lookup against the matching store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Student(StudentId),
    Teacher(TeacherId),
    Admin(AdminId),
}

impl Identity {
    /// Returns the role of this identity.
    pub fn role(&self) -> Role {
        match self {
            Identity::Student(_) => Role::Student,
            Identity::Teacher(_) => Role::Teacher,
            Identity::Admin(_) => Role::Admin,
        }
    }

    /// Returns the student id if this identity is a student.
    pub fn as_student(&self) -> Option<&StudentId> {
        match self {
            Identity::Student(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the underlying subject uuid regardless of role.
    pub fn subject(&self) -> &Uuid {
        match self {
            Identity::Student(id) => id.as_uuid(),
            Identity::Teacher(id) => id.as_uuid(),
            Identity::Admin(id) => id.as_uuid(),
        }
    }
}

/// Authentication errors that can occur during token validation.
///
/// These errors are domain-centric - they describe what went wrong
/// from the application's perspective, not the token issuer's.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired (separate from InvalidToken for specific handling).
    #[error("Token expired")]
    TokenExpired,

    /// Token is valid but the subject no longer exists in the system.
    #[error("User not found")]
    UserNotFound,

    /// The authentication backend is unavailable (network, config, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the caller should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UserNotFound
        )
    }
}
