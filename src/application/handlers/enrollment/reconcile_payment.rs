//! ReconcilePaymentHandler - converts a verified payment into membership
//! and entitlement state.
//!
//! One code path serves first purchase and renewal. Every effect is
//! independently idempotent, so replaying the same verified payment leaves
//! the same final state (modulo the window restarting from the replay
//! instant, which is the documented renewal behavior).

use std::sync::Arc;

use crate::domain::enrollment::{Entitlement, EnrollmentError, VerifiedPayment};
use crate::domain::foundation::{BatchId, EntitlementId, ErrorCode, StudentId, Timestamp};
use crate::ports::{BatchRepository, EntitlementRepository, StudentRepository};

/// Command to reconcile one verified payment.
///
/// Carries a [`VerifiedPayment`], which only the signature verifier can
/// produce - an unverified confirmation cannot reach this handler.
#[derive(Debug, Clone)]
pub struct ReconcilePaymentCommand {
    pub student_id: StudentId,
    pub batch_id: BatchId,
    pub payment: VerifiedPayment,
}

/// Result of reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileResult {
    /// The entitlement as persisted (created or renewed).
    pub entitlement: Entitlement,

    /// True if this payment added the student to the batch's membership;
    /// false if they were already enrolled.
    pub newly_enrolled: bool,
}

/// Handler for payment reconciliation.
pub struct ReconcilePaymentHandler {
    batches: Arc<dyn BatchRepository>,
    students: Arc<dyn StudentRepository>,
    entitlements: Arc<dyn EntitlementRepository>,
    renewal_days: i64,
}

impl ReconcilePaymentHandler {
    pub fn new(
        batches: Arc<dyn BatchRepository>,
        students: Arc<dyn StudentRepository>,
        entitlements: Arc<dyn EntitlementRepository>,
        renewal_days: i64,
    ) -> Self {
        Self {
            batches,
            students,
            entitlements,
            renewal_days,
        }
    }

    /// Reconcile a verified payment into membership + entitlement.
    ///
    /// Steps, each idempotent on its own:
    /// 1. Load batch (404 if absent)
    /// 2. Load student (404 if absent)
    /// 3. Add the pair to the membership relation (store-level add-if-absent)
    /// 4. Upsert the entitlement: renew if present, insert if not; a
    ///    concurrent-insert conflict is retried as an update and never
    ///    surfaced
    pub async fn handle(
        &self,
        cmd: ReconcilePaymentCommand,
    ) -> Result<ReconcileResult, EnrollmentError> {
        let batch = self
            .batches
            .find_by_id(&cmd.batch_id)
            .await?
            .ok_or(EnrollmentError::BatchNotFound(cmd.batch_id))?;

        let student = self
            .students
            .find_by_id(&cmd.student_id)
            .await?
            .ok_or(EnrollmentError::StudentNotFound(cmd.student_id))?;

        let newly_enrolled = self.batches.add_member(&batch.id, &student.id).await?;

        let now = Timestamp::now();
        let entitlement = match self
            .entitlements
            .find_by_pair(&cmd.student_id, &cmd.batch_id)
            .await?
        {
            Some(mut existing) => {
                existing
                    .renew(&cmd.payment, now, self.renewal_days)
                    .map_err(|e| EnrollmentError::infrastructure(e.to_string()))?;
                self.entitlements.update(&existing).await?;
                existing
            }
            None => {
                let fresh = Entitlement::grant(
                    EntitlementId::new(),
                    cmd.student_id,
                    cmd.batch_id,
                    &cmd.payment,
                    now,
                    self.renewal_days,
                );
                match self.entitlements.insert(&fresh).await {
                    Ok(()) => fresh,
                    Err(err) if err.code == ErrorCode::EntitlementExists => {
                        // Lost a concurrent-creation race: the row exists
                        // now, so renew it instead.
                        tracing::debug!(
                            student_id = %cmd.student_id,
                            batch_id = %cmd.batch_id,
                            "entitlement insert conflicted, retrying as renewal"
                        );
                        self.renew_after_conflict(&cmd, now).await?
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        tracing::info!(
            student_id = %cmd.student_id,
            batch_id = %cmd.batch_id,
            payment_id = cmd.payment.payment_id(),
            newly_enrolled,
            expiry = %entitlement.expiry_date.as_datetime(),
            "payment reconciled"
        );

        Ok(ReconcileResult {
            entitlement,
            newly_enrolled,
        })
    }

    /// Conflict fallback: the pair's row must exist, so load and renew it.
    async fn renew_after_conflict(
        &self,
        cmd: &ReconcilePaymentCommand,
        now: Timestamp,
    ) -> Result<Entitlement, EnrollmentError> {
        let mut existing = self
            .entitlements
            .find_by_pair(&cmd.student_id, &cmd.batch_id)
            .await?
            .ok_or_else(|| {
                EnrollmentError::infrastructure("entitlement missing after insert conflict")
            })?;

        existing
            .renew(&cmd.payment, now, self.renewal_days)
            .map_err(|e| EnrollmentError::infrastructure(e.to_string()))?;
        self.entitlements.update(&existing).await?;
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch::Batch;
    use crate::domain::foundation::{DomainError, TeacherId};
    use crate::domain::student::Student;
    use crate::ports::BatchSummary;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockBatchRepository {
        batches: Mutex<HashMap<BatchId, Batch>>,
        members: Mutex<HashSet<(BatchId, StudentId)>>,
    }

    impl MockBatchRepository {
        fn with_batch(batch: Batch) -> Self {
            let mut batches = HashMap::new();
            batches.insert(batch.id, batch);
            Self {
                batches: Mutex::new(batches),
                members: Mutex::new(HashSet::new()),
            }
        }

        fn empty() -> Self {
            Self {
                batches: Mutex::new(HashMap::new()),
                members: Mutex::new(HashSet::new()),
            }
        }

        fn member_count(&self, batch_id: &BatchId, student_id: &StudentId) -> usize {
            let members = self.members.lock().unwrap();
            usize::from(members.contains(&(*batch_id, *student_id)))
        }
    }

    #[async_trait]
    impl BatchRepository for MockBatchRepository {
        async fn find_by_id(&self, id: &BatchId) -> Result<Option<Batch>, DomainError> {
            Ok(self.batches.lock().unwrap().get(id).cloned())
        }

        async fn add_member(
            &self,
            batch_id: &BatchId,
            student_id: &StudentId,
        ) -> Result<bool, DomainError> {
            Ok(self.members.lock().unwrap().insert((*batch_id, *student_id)))
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

    struct MockStudentRepository {
        students: Mutex<HashMap<StudentId, Student>>,
    }

    impl MockStudentRepository {
        fn with_student(student: Student) -> Self {
            let mut students = HashMap::new();
            students.insert(student.id, student);
            Self {
                students: Mutex::new(students),
            }
        }

        fn empty() -> Self {
            Self {
                students: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl StudentRepository for MockStudentRepository {
        async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, DomainError> {
            Ok(self.students.lock().unwrap().get(id).cloned())
        }
    }

    struct MockEntitlementRepository {
        rows: Mutex<HashMap<(StudentId, BatchId), Entitlement>>,
        /// When set, the next N insert calls fail with EntitlementExists
        /// while a concurrent writer's row appears in `rows`.
        conflict_insert: AtomicU32,
    }

    impl MockEntitlementRepository {
        fn new() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
                conflict_insert: AtomicU32::new(0),
            }
        }

        fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        fn get(&self, student_id: &StudentId, batch_id: &BatchId) -> Option<Entitlement> {
            self.rows
                .lock()
                .unwrap()
                .get(&(*student_id, *batch_id))
                .cloned()
        }

        /// Simulate losing a creation race: the insert fails, and the other
        /// writer's row is already in place.
        fn arm_conflict_with(&self, existing: Entitlement) {
            self.rows
                .lock()
                .unwrap()
                .insert((existing.student_id, existing.batch_id), existing);
            self.conflict_insert.store(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl EntitlementRepository for MockEntitlementRepository {
        async fn insert(&self, entitlement: &Entitlement) -> Result<(), DomainError> {
            if self.conflict_insert.load(Ordering::SeqCst) > 0 {
                self.conflict_insert.fetch_sub(1, Ordering::SeqCst);
                return Err(DomainError::new(
                    ErrorCode::EntitlementExists,
                    "duplicate (student_id, batch_id)",
                ));
            }
            let mut rows = self.rows.lock().unwrap();
            let key = (entitlement.student_id, entitlement.batch_id);
            if rows.contains_key(&key) {
                return Err(DomainError::new(
                    ErrorCode::EntitlementExists,
                    "duplicate (student_id, batch_id)",
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
            Ok(self.get(student_id, batch_id))
        }

        async fn expire_overdue(&self, now: Timestamp) -> Result<u64, DomainError> {
            let mut rows = self.rows.lock().unwrap();
            let mut flipped = 0;
            for row in rows.values_mut() {
                if row.needs_expiry_flip(now) {
                    row.mark_expired(now).ok();
                    flipped += 1;
                }
            }
            Ok(flipped)
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn test_batch() -> Batch {
        Batch::new(
            BatchId::new(),
            "PHY-2026-A",
            "Physics Foundation",
            TeacherId::new(),
            25,
            500,
            Timestamp::now(),
        )
        .unwrap()
    }

    fn test_student() -> Student {
        Student::new(StudentId::new(), "Asha", "9999900000").unwrap()
    }

    fn payment(order: &str, pay: &str) -> VerifiedPayment {
        VerifiedPayment::assume_verified(order, pay)
    }

    struct Fixture {
        batches: Arc<MockBatchRepository>,
        #[allow(dead_code)]
        students: Arc<MockStudentRepository>,
        entitlements: Arc<MockEntitlementRepository>,
        handler: ReconcilePaymentHandler,
        batch_id: BatchId,
        student_id: StudentId,
    }

    fn fixture() -> Fixture {
        let batch = test_batch();
        let student = test_student();
        let batch_id = batch.id;
        let student_id = student.id;

        let batches = Arc::new(MockBatchRepository::with_batch(batch));
        let students = Arc::new(MockStudentRepository::with_student(student));
        let entitlements = Arc::new(MockEntitlementRepository::new());

        let handler = ReconcilePaymentHandler::new(
            batches.clone(),
            students.clone(),
            entitlements.clone(),
            30,
        );

        Fixture {
            batches,
            students,
            entitlements,
            handler,
            batch_id,
            student_id,
        }
    }

    fn command(f: &Fixture, order: &str, pay: &str) -> ReconcilePaymentCommand {
        ReconcilePaymentCommand {
            student_id: f.student_id,
            batch_id: f.batch_id,
            payment: payment(order, pay),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // First Payment Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn first_payment_creates_entitlement_and_enrolls() {
        let f = fixture();

        let result = f.handler.handle(command(&f, "order_1", "pay_1")).await.unwrap();

        assert!(result.newly_enrolled);
        assert!(result.entitlement.has_ever_paid);
        assert_eq!(result.entitlement.payment_id, "pay_1");
        assert_eq!(f.entitlements.row_count(), 1);
        assert_eq!(f.batches.member_count(&f.batch_id, &f.student_id), 1);
    }

    #[tokio::test]
    async fn expiry_is_renewal_period_after_start() {
        let f = fixture();

        let result = f.handler.handle(command(&f, "order_1", "pay_1")).await.unwrap();

        let window = result
            .entitlement
            .expiry_date
            .duration_since(&result.entitlement.start_date);
        assert_eq!(window.num_days(), 30);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Idempotence Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn replaying_same_payment_leaves_one_row_and_one_membership() {
        let f = fixture();
        let cmd = command(&f, "order_1", "pay_1");

        let first = f.handler.handle(cmd.clone()).await.unwrap();
        let second = f.handler.handle(cmd).await.unwrap();

        assert!(first.newly_enrolled);
        assert!(!second.newly_enrolled);
        assert_eq!(f.entitlements.row_count(), 1);
        assert_eq!(f.batches.member_count(&f.batch_id, &f.student_id), 1);
        assert_eq!(second.entitlement.payment_id, "pay_1");
        assert_eq!(second.entitlement.order_id, "order_1");
    }

    #[tokio::test]
    async fn renewal_updates_window_and_payment_ids() {
        let f = fixture();

        f.handler.handle(command(&f, "order_1", "pay_1")).await.unwrap();
        let renewed = f.handler.handle(command(&f, "order_2", "pay_2")).await.unwrap();

        assert_eq!(renewed.entitlement.payment_id, "pay_2");
        assert_eq!(renewed.entitlement.order_id, "order_2");
        assert!(renewed.entitlement.has_ever_paid);
        assert_eq!(f.entitlements.row_count(), 1);

        let stored = f.entitlements.get(&f.student_id, &f.batch_id).unwrap();
        assert_eq!(stored.payment_id, "pay_2");
    }

    #[tokio::test]
    async fn expiry_never_precedes_start_after_reconciliation() {
        let f = fixture();

        for (order, pay) in [("o1", "p1"), ("o2", "p2"), ("o3", "p3")] {
            let result = f.handler.handle(command(&f, order, pay)).await.unwrap();
            assert!(result.entitlement.expiry_date >= result.entitlement.start_date);
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Not Found Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_batch_fails_before_any_write() {
        let student = test_student();
        let student_id = student.id;
        let batches = Arc::new(MockBatchRepository::empty());
        let entitlements = Arc::new(MockEntitlementRepository::new());
        let handler = ReconcilePaymentHandler::new(
            batches.clone(),
            Arc::new(MockStudentRepository::with_student(student)),
            entitlements.clone(),
            30,
        );

        let missing = BatchId::new();
        let result = handler
            .handle(ReconcilePaymentCommand {
                student_id,
                batch_id: missing,
                payment: payment("o", "p"),
            })
            .await;

        assert_eq!(result.unwrap_err(), EnrollmentError::BatchNotFound(missing));
        assert_eq!(entitlements.row_count(), 0);
    }

    #[tokio::test]
    async fn missing_student_fails_before_any_write() {
        let batch = test_batch();
        let batch_id = batch.id;
        let entitlements = Arc::new(MockEntitlementRepository::new());
        let handler = ReconcilePaymentHandler::new(
            Arc::new(MockBatchRepository::with_batch(batch)),
            Arc::new(MockStudentRepository::empty()),
            entitlements.clone(),
            30,
        );

        let missing = StudentId::new();
        let result = handler
            .handle(ReconcilePaymentCommand {
                student_id: missing,
                batch_id,
                payment: payment("o", "p"),
            })
            .await;

        assert_eq!(
            result.unwrap_err(),
            EnrollmentError::StudentNotFound(missing)
        );
        assert_eq!(entitlements.row_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Concurrency Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn insert_conflict_is_retried_as_renewal() {
        let f = fixture();

        // Another request won the creation race between our find and insert.
        let rival = Entitlement::grant(
            EntitlementId::new(),
            f.student_id,
            f.batch_id,
            &payment("order_rival", "pay_rival"),
            Timestamp::now(),
            30,
        );
        let rival_id = rival.id;
        f.entitlements.arm_conflict_with(rival);

        let result = f.handler.handle(command(&f, "order_2", "pay_2")).await.unwrap();

        // Still exactly one row: the rival's, renewed with our payment.
        assert_eq!(f.entitlements.row_count(), 1);
        assert_eq!(result.entitlement.id, rival_id);
        assert_eq!(result.entitlement.payment_id, "pay_2");
    }

    #[tokio::test]
    async fn concurrent_replays_converge_to_one_row() {
        let f = fixture();
        let cmd = command(&f, "order_1", "pay_1");

        let (a, b) = tokio::join!(f.handler.handle(cmd.clone()), f.handler.handle(cmd));

        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(f.entitlements.row_count(), 1);
        assert_eq!(f.batches.member_count(&f.batch_id, &f.student_id), 1);
    }
}
