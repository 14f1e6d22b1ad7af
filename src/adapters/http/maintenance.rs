//! Maintenance endpoints.
//!
//! The expiry sweep is optional for correctness (the read path transitions
//! lazily); exposing it lets an operator or cron keep the cached status
//! column fresh.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::{routing::post, Json, Router};

use crate::domain::enrollment::EnrollmentError;
use crate::domain::foundation::Identity;

use super::error::ApiError;
use super::middleware::RequireIdentity;
use super::payment::dto::ExpireOverdueResponse;
use super::state::AppState;

/// POST /api/maintenance/expire-overdue - bulk-flip overdue entitlements.
///
/// Admin only.
pub async fn expire_overdue(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<impl IntoResponse, ApiError> {
    if !matches!(identity, Identity::Admin(_)) {
        return Err(EnrollmentError::forbidden("Admin access required").into());
    }

    let handler = state.expire_overdue_handler();
    let result = handler.handle().await?;

    Ok(Json(ExpireOverdueResponse {
        expired: result.expired,
    }))
}

/// Create the maintenance API router.
pub fn maintenance_routes() -> Router<AppState> {
    Router::new().route("/expire-overdue", post(expire_overdue))
}
