//! HTTP DTOs for payment endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::handlers::payment::{CreateOrderResult, StudentProfile};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a payment order for a batch purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub batch_id: Uuid,
}

/// Payment confirmation callback from the client after checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub batch_id: Uuid,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response carrying everything the client needs to open checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    /// Public key id for the provider's checkout widget.
    pub key: String,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub batch_name: String,
    pub price: i64,
}

impl From<CreateOrderResult> for CreateOrderResponse {
    fn from(result: CreateOrderResult) -> Self {
        Self {
            key: result.key_id,
            order_id: result.order.order_id,
            amount: result.order.amount,
            currency: result.order.currency,
            batch_name: result.batch_name,
            price: result.price,
        }
    }
}

/// An enrolled batch in the profile payload.
#[derive(Debug, Clone, Serialize)]
pub struct EnrolledBatchDto {
    pub id: String,
    pub name: String,
}

/// Refreshed student profile for the client's store.
#[derive(Debug, Clone, Serialize)]
pub struct StudentProfileDto {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub enrolled_batches: Vec<EnrolledBatchDto>,
}

impl From<StudentProfile> for StudentProfileDto {
    fn from(profile: StudentProfile) -> Self {
        Self {
            id: profile.id.to_string(),
            name: profile.name,
            phone: profile.phone,
            enrolled_batches: profile
                .enrolled_batches
                .into_iter()
                .map(|b| EnrolledBatchDto {
                    id: b.id.to_string(),
                    name: b.name,
                })
                .collect(),
        }
    }
}

/// Response after a successful verification + reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
    pub user: StudentProfileDto,
}

/// Response for the maintenance sweep.
#[derive(Debug, Clone, Serialize)]
pub struct ExpireOverdueResponse {
    pub expired: u64,
}
