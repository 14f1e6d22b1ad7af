//! CheckBatchAccessHandler - per-request visibility query.
//!
//! Loads the batch and (for students) the entitlement, runs the pure
//! decision engine, persists the lazy expiry flip when one is due, and
//! returns either the full payload or the sanitized preview. Blocked
//! outcomes surface as the matching domain errors.

use std::sync::Arc;

use crate::domain::batch::{BatchContent, BatchPreview};
use crate::domain::enrollment::{decide, is_privileged, AccessDecision, EnrollmentError};
use crate::domain::foundation::{BatchId, Identity, Timestamp};
use crate::ports::{BatchRepository, EntitlementRepository};

/// Query for one viewer's visibility into one batch.
#[derive(Debug, Clone)]
pub struct CheckBatchAccessQuery {
    pub identity: Identity,
    pub batch_id: BatchId,
}

/// Granted visibility: the full payload or the public preview.
///
/// Denied visibility is reported through [`EnrollmentError`]
/// (`SubscriptionExpired` or `Forbidden`).
#[derive(Debug, Clone)]
pub enum BatchAccess {
    Full(BatchContent),
    Preview(BatchPreview),
}

/// Handler for batch access checks.
///
/// Evaluated fresh on every request; nothing is cached across requests.
/// The only mutation performed is the lazy status flip of a stale
/// entitlement - it never creates or deletes entitlements and never
/// touches membership.
pub struct CheckBatchAccessHandler {
    batches: Arc<dyn BatchRepository>,
    entitlements: Arc<dyn EntitlementRepository>,
}

impl CheckBatchAccessHandler {
    pub fn new(
        batches: Arc<dyn BatchRepository>,
        entitlements: Arc<dyn EntitlementRepository>,
    ) -> Self {
        Self {
            batches,
            entitlements,
        }
    }

    pub async fn handle(
        &self,
        query: CheckBatchAccessQuery,
    ) -> Result<BatchAccess, EnrollmentError> {
        let batch = self
            .batches
            .find_by_id(&query.batch_id)
            .await?
            .ok_or(EnrollmentError::BatchNotFound(query.batch_id))?;

        // Admins and the owning teacher skip entitlement lookup entirely.
        if is_privileged(&query.identity, &batch) {
            let roster = self.batches.roster(&batch.id).await?;
            return Ok(BatchAccess::Full(BatchContent { batch, roster }));
        }

        // Non-student, non-privileged viewers (a teacher browsing someone
        // else's batch) can never hold an entitlement: public face only.
        let Some(student_id) = query.identity.as_student().copied() else {
            return Ok(BatchAccess::Preview(BatchPreview::of(&batch)));
        };

        let entitlement = self
            .entitlements
            .find_by_pair(&student_id, &batch.id)
            .await?;

        let now = Timestamp::now();
        let outcome = decide(&batch, entitlement.as_ref(), now);

        if outcome.flip_to_expired {
            // The one side effect of the read path: persist the stale
            // status as expired. Single-row update, safe to retry.
            let mut stale = entitlement
                .clone()
                .ok_or_else(|| EnrollmentError::infrastructure("flip requested without row"))?;
            stale
                .mark_expired(now)
                .map_err(|e| EnrollmentError::infrastructure(e.to_string()))?;
            self.entitlements.update(&stale).await?;

            tracing::info!(
                student_id = %student_id,
                batch_id = %batch.id,
                "entitlement lazily expired on read"
            );
        }

        match outcome.decision {
            AccessDecision::Full => {
                let roster = self.batches.roster(&batch.id).await?;
                Ok(BatchAccess::Full(BatchContent { batch, roster }))
            }
            AccessDecision::Preview => Ok(BatchAccess::Preview(BatchPreview::of(&batch))),
            AccessDecision::RenewalRequired { price, batch_name } => {
                Err(EnrollmentError::subscription_expired(price, batch_name))
            }
            AccessDecision::CompletedLocked => Err(EnrollmentError::forbidden(
                "This batch is completed. Only paid students can view content.",
            )),
        }
    }
}
