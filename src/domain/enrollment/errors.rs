//! Enrollment-specific error types.
//!
//! Errors related to payment verification, reconciliation, and access
//! decisions.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | BatchNotFound | 404 |
//! | StudentNotFound | 404 |
//! | Forbidden | 403 |
//! | PaymentRejected | 400 |
//! | SubscriptionExpired | 402 |
//! | Conflict | 409 (internal; converted to a retried update) |
//! | Unauthenticated | 401 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{BatchId, DomainError, ErrorCode, StudentId};

/// Enrollment-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentError {
    /// Batch was not found.
    BatchNotFound(BatchId),

    /// Student was not found.
    StudentNotFound(StudentId),

    /// Role or completed-batch policy denies the request.
    Forbidden { reason: String },

    /// Payment signature verification failed. Terminal; the client must
    /// restart the payment flow.
    PaymentRejected,

    /// The entitlement window has passed; carries what the client needs
    /// to offer a renewal purchase.
    SubscriptionExpired { price: i64, batch_name: String },

    /// Unique-constraint violation on concurrent entitlement creation.
    /// Never surfaced to callers: the reconciler retries as an update.
    Conflict {
        student: StudentId,
        batch: BatchId,
    },

    /// Missing or invalid caller identity.
    Unauthenticated,

    /// Infrastructure error.
    Infrastructure(String),
}

impl EnrollmentError {
    // Constructor functions for cleaner error creation

    pub fn batch_not_found(id: BatchId) -> Self {
        EnrollmentError::BatchNotFound(id)
    }

    pub fn student_not_found(id: StudentId) -> Self {
        EnrollmentError::StudentNotFound(id)
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        EnrollmentError::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn payment_rejected() -> Self {
        EnrollmentError::PaymentRejected
    }

    pub fn subscription_expired(price: i64, batch_name: impl Into<String>) -> Self {
        EnrollmentError::SubscriptionExpired {
            price,
            batch_name: batch_name.into(),
        }
    }

    pub fn conflict(student: StudentId, batch: BatchId) -> Self {
        EnrollmentError::Conflict { student, batch }
    }

    pub fn unauthenticated() -> Self {
        EnrollmentError::Unauthenticated
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        EnrollmentError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EnrollmentError::BatchNotFound(_) => ErrorCode::BatchNotFound,
            EnrollmentError::StudentNotFound(_) => ErrorCode::StudentNotFound,
            EnrollmentError::Forbidden { .. } => ErrorCode::Forbidden,
            EnrollmentError::PaymentRejected => ErrorCode::PaymentRejected,
            EnrollmentError::SubscriptionExpired { .. } => ErrorCode::SubscriptionExpired,
            EnrollmentError::Conflict { .. } => ErrorCode::EntitlementExists,
            EnrollmentError::Unauthenticated => ErrorCode::Unauthorized,
            EnrollmentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            EnrollmentError::BatchNotFound(id) => format!("Batch not found: {}", id),
            EnrollmentError::StudentNotFound(id) => format!("Student not found: {}", id),
            EnrollmentError::Forbidden { reason } => reason.clone(),
            EnrollmentError::PaymentRejected => "Payment verification failed".to_string(),
            EnrollmentError::SubscriptionExpired { batch_name, .. } => {
                format!("Subscription for '{}' expired. Please renew.", batch_name)
            }
            EnrollmentError::Conflict { student, batch } => format!(
                "Entitlement already exists for student {} in batch {}",
                student, batch
            ),
            EnrollmentError::Unauthenticated => "User not authenticated".to_string(),
            EnrollmentError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if the reconciler should retry this as an update.
    ///
    /// Only the unique-pair conflict qualifies; every other error is
    /// terminal for the request.
    pub fn is_conflict(&self) -> bool {
        matches!(self, EnrollmentError::Conflict { .. })
    }
}

impl std::fmt::Display for EnrollmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for EnrollmentError {}

impl From<DomainError> for EnrollmentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Unauthorized => EnrollmentError::Unauthenticated,
            ErrorCode::Forbidden => EnrollmentError::Forbidden {
                reason: err.message,
            },
            _ => EnrollmentError::Infrastructure(err.to_string()),
        }
    }
}
