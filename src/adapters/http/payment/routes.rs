//! Axum router for payment endpoints.

use axum::{routing::post, Router};

use super::super::state::AppState;
use super::handlers::{create_order, verify_payment};

/// Create the payment API router.
///
/// # Routes (require authentication)
///
/// - `POST /order` - create a provider order for a batch purchase
/// - `POST /verify` - verify a signed payment confirmation and enroll
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(create_order))
        .route("/verify", post(verify_payment))
}
