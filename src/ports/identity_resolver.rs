//! Identity resolution port.
//!
//! Resolves a validated principal into a concrete [`Identity`] variant with
//! one role-tagged lookup. The role claim selects which account store is
//! consulted - there is no "first collection that recognizes this id wins"
//! probing.

use crate::domain::foundation::{AuthPrincipal, DomainError, Identity};
use async_trait::async_trait;

/// Port for resolving principals to identities.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Look up the principal's account in the store matching its role.
    ///
    /// Returns `None` if the token was valid but the account no longer
    /// exists.
    async fn resolve(&self, principal: &AuthPrincipal) -> Result<Option<Identity>, DomainError>;
}
