//! VerifyPaymentHandler - signature check, reconciliation, updated profile.
//!
//! The verification step is pure and runs before any state is read or
//! written; only a confirmation that passes it can reach the reconciler.
//! On success the client gets the student's refreshed profile with the
//! enrolled-batch names populated.

use std::sync::Arc;

use crate::application::handlers::enrollment::{
    ReconcilePaymentCommand, ReconcilePaymentHandler,
};
use crate::domain::enrollment::{Entitlement, EnrollmentError, PaymentVerifier};
use crate::domain::foundation::{BatchId, StudentId};
use crate::ports::{BatchRepository, BatchSummary, StudentRepository};

/// Command carrying one payment confirmation from the client.
#[derive(Debug, Clone)]
pub struct VerifyPaymentCommand {
    pub student_id: StudentId,
    pub batch_id: BatchId,
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Refreshed student profile returned after successful reconciliation.
#[derive(Debug, Clone)]
pub struct StudentProfile {
    pub id: StudentId,
    pub name: String,
    pub phone: String,
    pub enrolled_batches: Vec<BatchSummary>,
}

/// Result of a verified payment.
#[derive(Debug, Clone)]
pub struct VerifyPaymentResult {
    pub profile: StudentProfile,
    pub entitlement: Entitlement,
}

/// Handler for the payment confirmation callback.
pub struct VerifyPaymentHandler {
    verifier: Arc<PaymentVerifier>,
    reconciler: ReconcilePaymentHandler,
    students: Arc<dyn StudentRepository>,
    batches: Arc<dyn BatchRepository>,
}

impl VerifyPaymentHandler {
    pub fn new(
        verifier: Arc<PaymentVerifier>,
        reconciler: ReconcilePaymentHandler,
        students: Arc<dyn StudentRepository>,
        batches: Arc<dyn BatchRepository>,
    ) -> Self {
        Self {
            verifier,
            reconciler,
            students,
            batches,
        }
    }

    pub async fn handle(
        &self,
        cmd: VerifyPaymentCommand,
    ) -> Result<VerifyPaymentResult, EnrollmentError> {
        // Hard gate: a forged signature never touches state.
        let payment = self
            .verifier
            .verify(&cmd.order_id, &cmd.payment_id, &cmd.signature)
            .map_err(|e| {
                tracing::warn!(
                    student_id = %cmd.student_id,
                    batch_id = %cmd.batch_id,
                    order_id = %cmd.order_id,
                    "payment confirmation rejected: signature mismatch"
                );
                e
            })?;

        let reconciled = self
            .reconciler
            .handle(ReconcilePaymentCommand {
                student_id: cmd.student_id,
                batch_id: cmd.batch_id,
                payment,
            })
            .await?;

        // Refresh the profile the client keeps in its store.
        let student = self
            .students
            .find_by_id(&cmd.student_id)
            .await?
            .ok_or(EnrollmentError::StudentNotFound(cmd.student_id))?;
        let enrolled_batches = self.batches.enrolled_batches(&student.id).await?;

        Ok(VerifyPaymentResult {
            profile: StudentProfile {
                id: student.id,
                name: student.name,
                phone: student.phone,
                enrolled_batches,
            },
            entitlement: reconciled.entitlement,
        })
    }
}
