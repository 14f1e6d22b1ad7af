//! Batch repository port.
//!
//! Batch persistence plus the membership relation. The relation
//! (batch_id, student_id) is the single authoritative record of who is
//! enrolled where; both "the batch's roster" and "the student's enrolled
//! batches" are projections of it.

use crate::domain::batch::Batch;
use crate::domain::foundation::{BatchId, DomainError, StudentId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Lightweight batch projection for enrolled-batch listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub id: BatchId,
    pub name: String,
}

/// Repository port for batches and the membership relation.
#[async_trait]
pub trait BatchRepository: Send + Sync {
    /// Find a batch by its id.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &BatchId) -> Result<Option<Batch>, DomainError>;

    /// Add a student to a batch's membership.
    ///
    /// Set semantics, atomic at the store level (add-if-absent, never a
    /// read-then-write in application code). Returns true if the pair was
    /// newly added, false if it was already present.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn add_member(
        &self,
        batch_id: &BatchId,
        student_id: &StudentId,
    ) -> Result<bool, DomainError>;

    /// The batch's roster: ids of all enrolled students.
    async fn roster(&self, batch_id: &BatchId) -> Result<Vec<StudentId>, DomainError>;

    /// The student's enrolled batches, as summaries for profile payloads.
    ///
    /// Projection of the same membership relation as [`roster`](Self::roster).
    async fn enrolled_batches(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<BatchSummary>, DomainError>;
}
