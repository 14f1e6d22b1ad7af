//! Razorpay order gateway adapter.
//!
//! Implements the `OrderGateway` port over the provider's Orders REST API.
//! Only order creation is consumed here; the confirmation signature is
//! checked by the domain verifier, not by calls back to the provider.
//!
//! # Security
//!
//! - Key secret held via `secrecy::SecretString`
//! - Secret never appears in logs or serialized output

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{OrderError, OrderGateway, PaymentOrder};

/// Razorpay API configuration.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Public key id (rzp_test_... or rzp_live_...).
    key_id: String,

    /// API key secret.
    key_secret: SecretString,

    /// Base URL for the API (default: https://api.razorpay.com).
    api_base_url: String,

    /// Currency for created orders.
    currency: String,
}

impl RazorpayConfig {
    /// Create a new configuration.
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: SecretString::new(key_secret.into()),
            api_base_url: "https://api.razorpay.com".to_string(),
            currency: currency.into(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Razorpay implementation of the `OrderGateway` port.
pub struct RazorpayOrderGateway {
    config: RazorpayConfig,
    http_client: reqwest::Client,
}

impl RazorpayOrderGateway {
    /// Create a new gateway with the given configuration.
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

/// Provider response for a created order.
#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

/// Provider error envelope.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    description: String,
}

#[async_trait]
impl OrderGateway for RazorpayOrderGateway {
    async fn create_order(&self, amount: i64, receipt: &str) -> Result<PaymentOrder, OrderError> {
        let url = format!("{}/v1/orders", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(&serde_json::json!({
                "amount": amount,
                "currency": self.config.currency,
                "receipt": receipt,
            }))
            .send()
            .await
            .map_err(|e| OrderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error.description)
                .unwrap_or_else(|_| "unknown provider error".to_string());

            tracing::warn!(status = status.as_u16(), %message, "order creation rejected");
            return Err(OrderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| OrderError::InvalidResponse(e.to_string()))?;

        Ok(PaymentOrder {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }

    fn key_id(&self) -> &str {
        &self.config.key_id
    }
}
