//! Axum router for batch endpoints.

use axum::{routing::get, Router};

use super::super::state::AppState;
use super::handlers::get_batch;

/// Create the batch API router.
///
/// # Routes
///
/// - `GET /:id` - access-gated batch content (requires authentication)
pub fn batch_routes() -> Router<AppState> {
    Router::new().route("/:id", get(get_batch))
}
