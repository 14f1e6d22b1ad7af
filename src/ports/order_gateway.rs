//! Order creation gateway port.
//!
//! The payment provider's order-creation call is an external collaborator:
//! this service hands it an amount and gets back an opaque order id that
//! later reappears, signed, in the payment confirmation. Nothing here is
//! interpreted beyond that.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An order created at the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    /// Opaque provider order id. Echoed back in the signed confirmation.
    pub order_id: String,

    /// Amount in minor currency units.
    pub amount: i64,

    /// ISO currency code.
    pub currency: String,
}

/// Errors from the order gateway.
#[derive(Debug, Clone, Error)]
pub enum OrderError {
    /// The provider rejected the request.
    #[error("Provider rejected order creation ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider could not be reached.
    #[error("Provider unreachable: {0}")]
    Network(String),

    /// The provider's response could not be parsed.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Port for creating payment orders at the provider.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Create an order for the given amount.
    ///
    /// `receipt` is a caller-chosen reference stored with the order.
    async fn create_order(&self, amount: i64, receipt: &str) -> Result<PaymentOrder, OrderError>;

    /// Public key id the client needs to open the provider's checkout.
    fn key_id(&self) -> &str;
}
