//! ExpireOverdueHandler - bulk sweep of overdue entitlements.
//!
//! Optional maintenance job. Correctness never depends on it: the access
//! path performs the same transition lazily on read. Running the sweep
//! keeps the cached `status` column fresh for reporting queries.

use std::sync::Arc;

use crate::domain::enrollment::EnrollmentError;
use crate::domain::foundation::Timestamp;
use crate::ports::EntitlementRepository;

/// Result of one sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpireOverdueResult {
    /// Number of entitlements transitioned to expired.
    pub expired: u64,
}

/// Handler for the overdue-entitlement sweep.
pub struct ExpireOverdueHandler {
    entitlements: Arc<dyn EntitlementRepository>,
}

impl ExpireOverdueHandler {
    pub fn new(entitlements: Arc<dyn EntitlementRepository>) -> Self {
        Self { entitlements }
    }

    pub async fn handle(&self) -> Result<ExpireOverdueResult, EnrollmentError> {
        let now = Timestamp::now();
        let expired = self.entitlements.expire_overdue(now).await?;

        if expired > 0 {
            tracing::info!(expired, "overdue entitlements swept");
        }

        Ok(ExpireOverdueResult { expired })
    }
}
