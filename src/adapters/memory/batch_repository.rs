//! In-memory implementation of BatchRepository.
//!
//! The membership relation is a set of (batch, student) pairs, so adds are
//! naturally add-if-absent, matching the store-level semantics of the
//! PostgreSQL adapter.

use crate::domain::batch::Batch;
use crate::domain::foundation::{BatchId, DomainError, StudentId};
use crate::ports::{BatchRepository, BatchSummary};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory batch store plus membership relation.
#[derive(Default)]
pub struct InMemoryBatchRepository {
    batches: Mutex<HashMap<BatchId, Batch>>,
    members: Mutex<HashSet<(BatchId, StudentId)>>,
}

impl InMemoryBatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a batch (test setup).
    pub fn put_batch(&self, batch: Batch) {
        self.batches.lock().unwrap().insert(batch.id, batch);
    }

    /// True if the pair is in the membership relation (test assertions).
    pub fn is_member(&self, batch_id: &BatchId, student_id: &StudentId) -> bool {
        self.members
            .lock()
            .unwrap()
            .contains(&(*batch_id, *student_id))
    }
}

#[async_trait]
impl BatchRepository for InMemoryBatchRepository {
    async fn find_by_id(&self, id: &BatchId) -> Result<Option<Batch>, DomainError> {
        Ok(self.batches.lock().unwrap().get(id).cloned())
    }

    async fn add_member(
        &self,
        batch_id: &BatchId,
        student_id: &StudentId,
    ) -> Result<bool, DomainError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .insert((*batch_id, *student_id)))
    }

    async fn roster(&self, batch_id: &BatchId) -> Result<Vec<StudentId>, DomainError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .iter()
            .filter(|(b, _)| b == batch_id)
            .map(|(_, s)| *s)
            .collect())
    }

    async fn enrolled_batches(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<BatchSummary>, DomainError> {
        let members = self.members.lock().unwrap();
        let batches = self.batches.lock().unwrap();
        Ok(members
            .iter()
            .filter(|(_, s)| s == student_id)
            .filter_map(|(b, _)| batches.get(b))
            .map(|b| BatchSummary {
                id: b.id,
                name: b.name.clone(),
            })
            .collect())
    }
}
