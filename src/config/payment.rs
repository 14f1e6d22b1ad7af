//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Public key id, handed to clients to open checkout
    pub key_id: String,

    /// Shared secret: signs orders at the provider and payment
    /// confirmations back to us
    pub key_secret: String,

    /// Entitlement window granted per successful payment, in days
    #[serde(default = "default_renewal_days")]
    pub renewal_days: i64,

    /// ISO currency code for orders
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl PaymentConfig {
    /// Check if using provider test mode
    pub fn is_test_mode(&self) -> bool {
        self.key_id.starts_with("rzp_test_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT_KEY_ID"));
        }
        if self.key_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT_KEY_SECRET"));
        }
        if self.renewal_days <= 0 {
            return Err(ValidationError::InvalidRenewalPeriod);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            key_secret: String::new(),
            renewal_days: default_renewal_days(),
            currency: default_currency(),
        }
    }
}

fn default_renewal_days() -> i64 {
    30
}

fn default_currency() -> String {
    "INR".to_string()
}
