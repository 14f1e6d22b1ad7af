//! Mock order gateway for tests and offline development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ports::{OrderError, OrderGateway, PaymentOrder};

/// Deterministic in-process order gateway.
#[derive(Default)]
pub struct MockOrderGateway {
    counter: AtomicU64,
}

impl MockOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderGateway for MockOrderGateway {
    async fn create_order(&self, amount: i64, _receipt: &str) -> Result<PaymentOrder, OrderError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PaymentOrder {
            order_id: format!("order_mock_{:06}", n),
            amount,
            currency: "INR".to_string(),
        })
    }

    fn key_id(&self) -> &str {
        "rzp_test_mock"
    }
}
