//! HTTP handlers for batch endpoints.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::application::handlers::enrollment::{BatchAccess, CheckBatchAccessQuery};
use crate::domain::foundation::BatchId;

use super::super::error::ApiError;
use super::super::middleware::RequireIdentity;
use super::super::state::AppState;
use super::dto::{FullBatchResponse, PreviewBatchResponse};

/// GET /api/batches/:id - batch content, gated by the access decision.
///
/// Full access returns the complete payload (classes, messages, roster);
/// non-entitled viewers get the sanitized preview. Expired entitlements
/// come back as 402 with the renewal prompt, completed-batch lockouts
/// as 403.
pub async fn get_batch(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let handler = state.check_batch_access_handler();
    let query = CheckBatchAccessQuery {
        identity,
        batch_id: BatchId::from_uuid(id),
    };

    let access = handler.handle(query).await?;

    let response = match access {
        BatchAccess::Full(content) => Json(FullBatchResponse::from(content)).into_response(),
        BatchAccess::Preview(preview) => {
            Json(PreviewBatchResponse::from(preview)).into_response()
        }
    };

    Ok(response)
}
