//! Entitlement aggregate entity.
//!
//! An entitlement authorizes one student to view one batch's content until
//! an expiry instant. Exactly one row exists per (student, batch) pair once
//! any payment has been verified for it; re-payment renews the existing row
//! rather than creating a second one.
//!
//! # Design Decisions
//!
//! - **One per pair**: unique constraint on (student_id, batch_id) enforced
//!   at the store level
//! - **Created by payment only**: there is no unpaid entitlement
//!   constructor; `grant` takes a [`VerifiedPayment`]
//! - **Status is cached**: the authoritative check is `now < expiry_date`,
//!   recomputed lazily on read
//! - **has_ever_paid is sticky**: once true it is never reset

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    BatchId, EntitlementId, StateMachine, StudentId, Timestamp, ValidationError,
};

use super::status::EntitlementStatus;
use super::verifier::VerifiedPayment;

/// Entitlement aggregate - one student's subscription to one batch.
///
/// # Invariants
///
/// - `(student_id, batch_id)` is unique across all entitlements
/// - `expiry_date >= start_date` always
/// - `has_ever_paid` never transitions from true to false
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Row identity for logging and updates.
    pub id: EntitlementId,

    /// Student half of the unique pair.
    pub student_id: StudentId,

    /// Batch half of the unique pair.
    pub batch_id: BatchId,

    /// Start of the current paid window.
    pub start_date: Timestamp,

    /// End of the current paid window.
    pub expiry_date: Timestamp,

    /// Cached status; recomputed lazily against `expiry_date` on read.
    pub status: EntitlementStatus,

    /// Sticky paid marker. Survives expiry and every later mutation.
    pub has_ever_paid: bool,

    /// Provider payment id that most recently created or renewed this row.
    pub payment_id: String,

    /// Provider order id matching `payment_id`.
    pub order_id: String,

    /// When the row was created.
    pub created_at: Timestamp,

    /// When the row was last updated.
    pub updated_at: Timestamp,
}

impl Entitlement {
    /// Create a fresh entitlement from the first verified payment for a pair.
    ///
    /// The paid window runs from `now` for `period_days` days, so
    /// `expiry_date >= start_date` holds by construction.
    pub fn grant(
        id: EntitlementId,
        student_id: StudentId,
        batch_id: BatchId,
        payment: &VerifiedPayment,
        now: Timestamp,
        period_days: i64,
    ) -> Self {
        Self {
            id,
            student_id,
            batch_id,
            start_date: now,
            expiry_date: now.add_days(period_days.max(0)),
            status: EntitlementStatus::Active,
            has_ever_paid: true,
            payment_id: payment.payment_id().to_string(),
            order_id: payment.order_id().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Renew this entitlement from a later verified payment.
    ///
    /// The window restarts at `now` - a second payment before expiry pushes
    /// the expiry out from now, it does not stack onto the old expiry.
    /// `has_ever_paid` stays true.
    ///
    /// # Errors
    ///
    /// Returns error if the status transition is not allowed (cannot happen
    /// with the current two-state machine, but kept validated).
    pub fn renew(
        &mut self,
        payment: &VerifiedPayment,
        now: Timestamp,
        period_days: i64,
    ) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(EntitlementStatus::Active)?;
        self.start_date = now;
        self.expiry_date = now.add_days(period_days.max(0));
        self.payment_id = payment.payment_id().to_string();
        self.order_id = payment.order_id().to_string();
        self.has_ever_paid = true;
        self.updated_at = now;
        Ok(())
    }

    /// Authoritative access window check.
    pub fn is_current(&self, now: Timestamp) -> bool {
        now < self.expiry_date
    }

    /// Returns true if the cached status disagrees with the clock and
    /// should be flipped to expired.
    pub fn needs_expiry_flip(&self, now: Timestamp) -> bool {
        self.status.is_active() && !self.is_current(now)
    }

    /// Flip the cached status to expired.
    ///
    /// The only mutation the read path performs; persisting it is a single
    /// row update.
    ///
    /// # Errors
    ///
    /// Returns error if the entitlement is already expired.
    pub fn mark_expired(&mut self, now: Timestamp) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(EntitlementStatus::Expired)?;
        self.updated_at = now;
        Ok(())
    }
}
