//! HTTP adapters - axum routers, handlers, DTOs, and middleware.

pub mod batch;
pub mod error;
pub mod maintenance;
pub mod middleware;
pub mod payment;
pub mod state;

use axum::middleware as axum_middleware;
use axum::Router;

pub use error::{ApiError, ErrorResponse};
pub use middleware::{auth_middleware, AuthState, RequireIdentity};
pub use state::AppState;

/// Build the complete API router.
///
/// All routes sit behind the auth middleware; handlers that require a
/// caller enforce it with [`RequireIdentity`].
///
/// # Routes
///
/// - `GET  /api/batches/:id`
/// - `POST /api/payments/order`
/// - `POST /api/payments/verify`
/// - `POST /api/maintenance/expire-overdue`
pub fn api_router(state: AppState, auth: AuthState) -> Router {
    Router::new()
        .nest("/api/batches", batch::batch_routes())
        .nest("/api/payments", payment::payment_routes())
        .nest("/api/maintenance", maintenance::maintenance_routes())
        .layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state)
}
