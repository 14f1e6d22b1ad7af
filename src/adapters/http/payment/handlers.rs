//! HTTP handlers for payment endpoints.

use axum::extract::State;
use axum::Json;
use axum::response::IntoResponse;

use crate::application::handlers::payment::{CreateOrderCommand, VerifyPaymentCommand};
use crate::domain::enrollment::EnrollmentError;
use crate::domain::foundation::BatchId;

use super::super::error::ApiError;
use super::super::middleware::RequireIdentity;
use super::super::state::AppState;
use super::dto::{
    CreateOrderRequest, CreateOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse,
};

/// POST /api/payments/order - create a provider order for a batch purchase.
pub async fn create_order(
    State(state): State<AppState>,
    RequireIdentity(_identity): RequireIdentity,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.create_order_handler();
    let result = handler
        .handle(CreateOrderCommand {
            batch_id: BatchId::from_uuid(request.batch_id),
        })
        .await?;

    Ok(Json(CreateOrderResponse::from(result)))
}

/// POST /api/payments/verify - verify a payment confirmation and enroll.
///
/// Authentication is checked before anything else; the signature check
/// runs before any state is read; only then does reconciliation happen.
pub async fn verify_payment(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let student_id = *identity
        .as_student()
        .ok_or_else(|| EnrollmentError::forbidden("Only students can purchase batch access"))?;

    let handler = state.verify_payment_handler();
    let result = handler
        .handle(VerifyPaymentCommand {
            student_id,
            batch_id: BatchId::from_uuid(request.batch_id),
            order_id: request.order_id,
            payment_id: request.payment_id,
            signature: request.signature,
        })
        .await?;

    Ok(Json(VerifyPaymentResponse {
        success: true,
        message: "Enrollment / renewal successful".to_string(),
        user: result.profile.into(),
    }))
}
