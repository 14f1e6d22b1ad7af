//! Shared HTTP application state.

use std::sync::Arc;

use crate::application::handlers::enrollment::{
    CheckBatchAccessHandler, ExpireOverdueHandler, ReconcilePaymentHandler,
};
use crate::application::handlers::payment::{CreateOrderHandler, VerifyPaymentHandler};
use crate::domain::enrollment::PaymentVerifier;
use crate::ports::{BatchRepository, EntitlementRepository, OrderGateway, StudentRepository};

/// Shared application state containing all handler dependencies.
///
/// Cloned per request; every dependency is Arc-wrapped. Nothing in here is
/// process-global - the state is assembled once in `main` and threaded
/// through the router.
#[derive(Clone)]
pub struct AppState {
    pub batches: Arc<dyn BatchRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub entitlements: Arc<dyn EntitlementRepository>,
    pub order_gateway: Arc<dyn OrderGateway>,
    pub verifier: Arc<PaymentVerifier>,
    pub renewal_days: i64,
}

impl AppState {
    /// Create handlers on demand from the shared state.
    pub fn check_batch_access_handler(&self) -> CheckBatchAccessHandler {
        CheckBatchAccessHandler::new(self.batches.clone(), self.entitlements.clone())
    }

    pub fn reconcile_payment_handler(&self) -> ReconcilePaymentHandler {
        ReconcilePaymentHandler::new(
            self.batches.clone(),
            self.students.clone(),
            self.entitlements.clone(),
            self.renewal_days,
        )
    }

    pub fn verify_payment_handler(&self) -> VerifyPaymentHandler {
        VerifyPaymentHandler::new(
            self.verifier.clone(),
            self.reconcile_payment_handler(),
            self.students.clone(),
            self.batches.clone(),
        )
    }

    pub fn create_order_handler(&self) -> CreateOrderHandler {
        CreateOrderHandler::new(self.batches.clone(), self.order_gateway.clone())
    }

    pub fn expire_overdue_handler(&self) -> ExpireOverdueHandler {
        ExpireOverdueHandler::new(self.entitlements.clone())
    }
}
