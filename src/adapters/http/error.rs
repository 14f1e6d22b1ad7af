//! HTTP error mapping.
//!
//! Converts the enrollment error taxonomy into HTTP responses with stable
//! error codes. `SubscriptionExpired` gets its own body shape carrying the
//! renewal prompt the client renders.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::domain::enrollment::EnrollmentError;

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

/// 402 body for expired subscriptions: everything the client needs to
/// offer a renewal purchase.
#[derive(Debug, Clone, Serialize)]
pub struct RenewalRequiredResponse {
    pub message: String,
    pub expired: bool,
    pub price: i64,
    pub batch_name: String,
}

/// API error wrapper converting domain errors to HTTP responses.
pub struct ApiError(pub EnrollmentError);

impl From<EnrollmentError> for ApiError {
    fn from(err: EnrollmentError) -> Self {
        Self(err)
    }
}

impl From<crate::domain::foundation::DomainError> for ApiError {
    fn from(err: crate::domain::foundation::DomainError) -> Self {
        Self(EnrollmentError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        // Expired subscriptions carry the renewal prompt instead of the
        // standard error envelope.
        if let EnrollmentError::SubscriptionExpired { price, batch_name } = &self.0 {
            let body = RenewalRequiredResponse {
                message: self.0.message(),
                expired: true,
                price: *price,
                batch_name: batch_name.clone(),
            };
            return (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response();
        }

        let status = match &self.0 {
            EnrollmentError::BatchNotFound(_) | EnrollmentError::StudentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            EnrollmentError::Forbidden { .. } => StatusCode::FORBIDDEN,
            EnrollmentError::PaymentRejected => StatusCode::BAD_REQUEST,
            EnrollmentError::SubscriptionExpired { .. } => StatusCode::PAYMENT_REQUIRED,
            // Conflicts are retried inside the reconciler; one escaping is
            // still reported honestly.
            EnrollmentError::Conflict { .. } => StatusCode::CONFLICT,
            EnrollmentError::Unauthenticated => StatusCode::UNAUTHORIZED,
            EnrollmentError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't leak store internals to clients.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "internal error");
            "Internal server error".to_string()
        } else {
            self.0.message()
        };

        let body = ErrorResponse::new(self.0.code().to_string(), message);
        (status, Json(body)).into_response()
    }
}
