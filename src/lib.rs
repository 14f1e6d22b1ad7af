//! Batchgate - entitlement-gated access to paid coaching batches.
//!
//! Reconciles verified payments into time-bounded entitlements and
//! decides, per request, whether batch content is fully visible, shown as
//! a sanitized preview, or blocked pending renewal.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
