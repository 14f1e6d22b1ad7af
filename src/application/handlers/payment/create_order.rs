//! CreateOrderHandler - opens a payment order at the provider.
//!
//! The order id returned here is an opaque token; it only matters again
//! when it reappears, signed, in the payment confirmation.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::enrollment::EnrollmentError;
use crate::domain::foundation::BatchId;
use crate::ports::{BatchRepository, OrderGateway, PaymentOrder};

/// Command to create an order for one batch purchase.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub batch_id: BatchId,
}

/// Everything the client needs to open the provider's checkout.
#[derive(Debug, Clone)]
pub struct CreateOrderResult {
    pub order: PaymentOrder,
    pub key_id: String,
    pub batch_name: String,
    pub price: i64,
}

/// Handler for order creation.
pub struct CreateOrderHandler {
    batches: Arc<dyn BatchRepository>,
    gateway: Arc<dyn OrderGateway>,
}

impl CreateOrderHandler {
    pub fn new(batches: Arc<dyn BatchRepository>, gateway: Arc<dyn OrderGateway>) -> Self {
        Self { batches, gateway }
    }

    pub async fn handle(
        &self,
        cmd: CreateOrderCommand,
    ) -> Result<CreateOrderResult, EnrollmentError> {
        let batch = self
            .batches
            .find_by_id(&cmd.batch_id)
            .await?
            .ok_or(EnrollmentError::BatchNotFound(cmd.batch_id))?;

        let receipt = format!("rcpt_{}", Uuid::new_v4().simple());
        let order = self
            .gateway
            .create_order(batch.price, &receipt)
            .await
            .map_err(|e| EnrollmentError::infrastructure(e.to_string()))?;

        tracing::info!(
            batch_id = %batch.id,
            order_id = %order.order_id,
            amount = order.amount,
            "payment order created"
        );

        Ok(CreateOrderResult {
            order,
            key_id: self.gateway.key_id().to_string(),
            batch_name: batch.name,
            price: batch.price,
        })
    }
}
