//! Entitlement repository port.
//!
//! Defines the contract for persisting and retrieving Entitlement
//! aggregates. Implementations handle the actual database operations.
//!
//! # Design
//!
//! - **Unique pair**: only one entitlement per (student, batch), enforced by
//!   the store, never by application-level locking
//! - **Distinct conflict**: a concurrent duplicate insert must surface as
//!   `EntitlementExists`, not as a generic failure and not as "not found",
//!   so the reconciler can retry it as an update
//! - **Single-row atomicity**: `update` and the bulk sweep are each one
//!   store round trip

use crate::domain::enrollment::Entitlement;
use crate::domain::foundation::{BatchId, DomainError, StudentId, Timestamp};
use async_trait::async_trait;

/// Repository port for Entitlement aggregate persistence.
#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    /// Insert a new entitlement row.
    ///
    /// # Errors
    ///
    /// - `EntitlementExists` if a row for the (student, batch) pair already
    ///   exists (including one created by a concurrent request)
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, entitlement: &Entitlement) -> Result<(), DomainError>;

    /// Update an existing entitlement row in place.
    ///
    /// # Errors
    ///
    /// - `EntitlementNotFound` if the row doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, entitlement: &Entitlement) -> Result<(), DomainError>;

    /// Find the entitlement for a (student, batch) pair.
    ///
    /// Returns `None` if the pair has never had a verified payment.
    async fn find_by_pair(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
    ) -> Result<Option<Entitlement>, DomainError>;

    /// Bulk-transition overdue active entitlements to expired.
    ///
    /// Maintenance sweep; optional for correctness since the read path
    /// performs the same transition lazily. Returns the number of rows
    /// flipped.
    async fn expire_overdue(&self, now: Timestamp) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn entitlement_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn EntitlementRepository) {}
    }
}
