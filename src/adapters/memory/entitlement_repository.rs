//! In-memory implementation of EntitlementRepository.
//!
//! Backs tests and local development without PostgreSQL. Reproduces the
//! store semantics that matter: the unique (student, batch) pair reports
//! `EntitlementExists` on duplicate insert, and the sweep flips only
//! overdue active rows.

use crate::domain::enrollment::Entitlement;
use crate::domain::foundation::{BatchId, DomainError, ErrorCode, StudentId, Timestamp};
use crate::ports::EntitlementRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory entitlement store keyed by the unique pair.
#[derive(Default)]
pub struct InMemoryEntitlementRepository {
    rows: Mutex<HashMap<(StudentId, BatchId), Entitlement>>,
}

impl InMemoryEntitlementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows (test assertions).
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// True if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EntitlementRepository for InMemoryEntitlementRepository {
    async fn insert(&self, entitlement: &Entitlement) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let key = (entitlement.student_id, entitlement.batch_id);
        if rows.contains_key(&key) {
            return Err(DomainError::new(
                ErrorCode::EntitlementExists,
                "Entitlement already exists for this (student, batch) pair",
            ));
        }
        rows.insert(key, entitlement.clone());
        Ok(())
    }

    async fn update(&self, entitlement: &Entitlement) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let key = (entitlement.student_id, entitlement.batch_id);
        if !rows.contains_key(&key) {
            return Err(DomainError::new(
                ErrorCode::EntitlementNotFound,
                "Entitlement not found",
            ));
        }
        rows.insert(key, entitlement.clone());
        Ok(())
    }

    async fn find_by_pair(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
    ) -> Result<Option<Entitlement>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&(*student_id, *batch_id))
            .cloned())
    }

    async fn expire_overdue(&self, now: Timestamp) -> Result<u64, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let mut flipped = 0;
        for row in rows.values_mut() {
            if row.needs_expiry_flip(now) && row.mark_expired(now).is_ok() {
                flipped += 1;
            }
        }
        Ok(flipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrollment::VerifiedPayment;
    use crate::domain::foundation::EntitlementId;

    fn entitlement(start: Timestamp) -> Entitlement {
        Entitlement::grant(
            EntitlementId::new(),
            StudentId::new(),
            BatchId::new(),
            &VerifiedPayment::assume_verified("o", "p"),
            start,
            30,
        )
    }

    #[tokio::test]
    async fn duplicate_pair_insert_conflicts() {
        let repo = InMemoryEntitlementRepository::new();
        let row = entitlement(Timestamp::now());

        repo.insert(&row).await.unwrap();
        let err = repo.insert(&row).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::EntitlementExists);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn update_of_missing_row_reports_not_found() {
        let repo = InMemoryEntitlementRepository::new();
        let err = repo.update(&entitlement(Timestamp::now())).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::EntitlementNotFound);
    }

    #[tokio::test]
    async fn sweep_flips_only_overdue_rows() {
        let repo = InMemoryEntitlementRepository::new();
        repo.insert(&entitlement(Timestamp::now().minus_days(45)))
            .await
            .unwrap();
        repo.insert(&entitlement(Timestamp::now())).await.unwrap();

        let flipped = repo.expire_overdue(Timestamp::now()).await.unwrap();

        assert_eq!(flipped, 1);
    }
}
