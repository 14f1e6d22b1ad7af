//! Payment confirmation signature verification.
//!
//! The payment provider signs each completed payment with
//! HMAC-SHA256 over `"{order_id}|{payment_id}"`, keyed by a secret shared
//! with this server. Verification is pure: no state is read or written, so
//! the reconciler can only ever run on a payment that passed this check.
//!
//! Any mismatch is a hard rejection. There is no retry and no partial
//! trust; the client must restart the payment flow.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::EnrollmentError;

type HmacSha256 = Hmac<Sha256>;

/// Proof that a payment confirmation carried a valid signature.
///
/// Only [`PaymentVerifier::verify`] can construct this, which keeps the
/// reconciler unreachable for unverified input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    order_id: String,
    payment_id: String,
}

impl VerifiedPayment {
    /// Provider order id this payment settled.
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Provider payment id.
    pub fn payment_id(&self) -> &str {
        &self.payment_id
    }

    /// Test-only constructor bypassing signature verification.
    #[cfg(test)]
    pub fn assume_verified(order_id: impl Into<String>, payment_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            payment_id: payment_id.into(),
        }
    }
}

/// Verifier for provider payment signatures.
pub struct PaymentVerifier {
    /// Shared signing secret from the provider dashboard.
    secret: SecretString,
}

impl PaymentVerifier {
    /// Creates a new verifier with the given shared secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    /// Verifies a payment confirmation.
    ///
    /// Computes HMAC-SHA256 over `"{order_id}|{payment_id}"` and compares
    /// it in constant time against the hex-encoded signature supplied by
    /// the client.
    ///
    /// # Errors
    ///
    /// Returns `PaymentRejected` on any mismatch, including malformed hex.
    pub fn verify(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<VerifiedPayment, EnrollmentError> {
        let supplied = hex::decode(signature).map_err(|_| EnrollmentError::payment_rejected())?;
        let expected = self.compute_signature(order_id, payment_id);

        if !constant_time_compare(&expected, &supplied) {
            return Err(EnrollmentError::payment_rejected());
        }

        Ok(VerifiedPayment {
            order_id: order_id.to_string(),
            payment_id: payment_id.to_string(),
        })
    }

    /// Computes the HMAC-SHA256 signature for the order/payment pair.
    fn compute_signature(&self, order_id: &str, payment_id: &str) -> Vec<u8> {
        let message = format!("{}|{}", order_id, payment_id);

        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key");
        mac.update(message.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the
/// expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a hex signature for use in test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    let message = format!("{}|{}", order_id, payment_id);
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "rzp_secret_test_12345";

    // ══════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_signature() {
        let verifier = PaymentVerifier::new(TEST_SECRET);
        let signature = compute_test_signature(TEST_SECRET, "order_123", "pay_456");

        let result = verifier.verify("order_123", "pay_456", &signature);

        assert!(result.is_ok());
        let payment = result.unwrap();
        assert_eq!(payment.order_id(), "order_123");
        assert_eq!(payment.payment_id(), "pay_456");
    }

    #[test]
    fn verify_forged_signature_fails() {
        let verifier = PaymentVerifier::new(TEST_SECRET);
        let forged = "a".repeat(64);

        let result = verifier.verify("order_123", "pay_456", &forged);

        assert_eq!(result, Err(EnrollmentError::PaymentRejected));
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let verifier = PaymentVerifier::new("wrong_secret");
        let signature = compute_test_signature(TEST_SECRET, "order_123", "pay_456");

        let result = verifier.verify("order_123", "pay_456", &signature);

        assert_eq!(result, Err(EnrollmentError::PaymentRejected));
    }

    #[test]
    fn verify_swapped_ids_fails() {
        let verifier = PaymentVerifier::new(TEST_SECRET);
        let signature = compute_test_signature(TEST_SECRET, "order_123", "pay_456");

        let result = verifier.verify("pay_456", "order_123", &signature);

        assert_eq!(result, Err(EnrollmentError::PaymentRejected));
    }

    #[test]
    fn verify_tampered_order_id_fails() {
        let verifier = PaymentVerifier::new(TEST_SECRET);
        let signature = compute_test_signature(TEST_SECRET, "order_123", "pay_456");

        let result = verifier.verify("order_999", "pay_456", &signature);

        assert_eq!(result, Err(EnrollmentError::PaymentRejected));
    }

    #[test]
    fn verify_malformed_hex_fails() {
        let verifier = PaymentVerifier::new(TEST_SECRET);

        let result = verifier.verify("order_123", "pay_456", "not-hex-at-all");

        assert_eq!(result, Err(EnrollmentError::PaymentRejected));
    }

    #[test]
    fn verify_truncated_signature_fails() {
        let verifier = PaymentVerifier::new(TEST_SECRET);
        let signature = compute_test_signature(TEST_SECRET, "order_123", "pay_456");
        let truncated = &signature[..32];

        let result = verifier.verify("order_123", "pay_456", truncated);

        assert_eq!(result, Err(EnrollmentError::PaymentRejected));
    }

    #[test]
    fn verify_empty_signature_fails() {
        let verifier = PaymentVerifier::new(TEST_SECRET);

        let result = verifier.verify("order_123", "pay_456", "");

        assert_eq!(result, Err(EnrollmentError::PaymentRejected));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_equal_values() {
        let a = vec![1, 2, 3, 4, 5];
        let b = vec![1, 2, 3, 4, 5];
        assert!(constant_time_compare(&a, &b));
    }

    #[test]
    fn constant_time_compare_different_values() {
        let a = vec![1, 2, 3, 4, 5];
        let b = vec![1, 2, 3, 4, 6];
        assert!(!constant_time_compare(&a, &b));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        let a = vec![1, 2, 3];
        let b = vec![1, 2, 3, 4];
        assert!(!constant_time_compare(&a, &b));
    }

    // ══════════════════════════════════════════════════════════════
    // Purity
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verification_is_repeatable() {
        let verifier = PaymentVerifier::new(TEST_SECRET);
        let signature = compute_test_signature(TEST_SECRET, "order_123", "pay_456");

        let first = verifier.verify("order_123", "pay_456", &signature);
        let second = verifier.verify("order_123", "pay_456", &signature);

        assert_eq!(first, second);
    }
}
