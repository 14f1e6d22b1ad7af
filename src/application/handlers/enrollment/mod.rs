//! Enrollment command and query handlers.

mod check_batch_access;
mod expire_overdue;
mod reconcile_payment;

pub use check_batch_access::{BatchAccess, CheckBatchAccessHandler, CheckBatchAccessQuery};
pub use expire_overdue::{ExpireOverdueHandler, ExpireOverdueResult};
pub use reconcile_payment::{ReconcilePaymentCommand, ReconcilePaymentHandler, ReconcileResult};
