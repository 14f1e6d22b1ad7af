//! Access decision engine.
//!
//! Pure functions deciding, for one request, whether batch content is fully
//! visible, shown as a preview, or blocked. Evaluated fresh on every request
//! with no caching.
//!
//! The read path owns exactly one side effect: when a stale `active` status
//! is discovered past its expiry, the caller persists the flip signalled by
//! [`AccessOutcome::flip_to_expired`]. Nothing here creates or deletes
//! entitlements or touches roster membership.

use crate::domain::batch::Batch;
use crate::domain::foundation::{Identity, Timestamp};

use super::entitlement::Entitlement;

/// Visibility decision for a (viewer, batch) request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Content fully visible.
    Full,

    /// Sanitized view only: no entitlement row exists for the pair.
    /// Not blocked - unpaid viewers may see the public face of a batch.
    Preview,

    /// Window expired on a still-running batch. Carries what the client
    /// needs to offer a re-purchase.
    RenewalRequired { price: i64, batch_name: String },

    /// Batch has completed and this viewer never paid. Hard block.
    CompletedLocked,
}

/// Decision plus the one permitted side effect for the read path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessOutcome {
    pub decision: AccessDecision,

    /// True when the entitlement's cached status should be persisted as
    /// expired (lazy transition).
    pub flip_to_expired: bool,
}

impl AccessOutcome {
    fn pure(decision: AccessDecision) -> Self {
        Self {
            decision,
            flip_to_expired: false,
        }
    }
}

/// Privileged viewers bypass entitlement lookup entirely: administrators
/// everywhere, and the teacher who owns the batch.
pub fn is_privileged(identity: &Identity, batch: &Batch) -> bool {
    match identity {
        Identity::Admin(_) => true,
        Identity::Teacher(id) => batch.is_owned_by(id),
        Identity::Student(_) => false,
    }
}

/// Decide visibility for a student (non-privileged) viewer.
///
/// Pure function of the batch's completion flag, the entitlement row (if
/// any), and the current time:
///
/// - no entitlement → preview
/// - completed batch → full if the student ever paid, else locked
/// - running batch, window passed → renewal required (+ lazy flip)
/// - running batch, window open → full
pub fn decide(batch: &Batch, entitlement: Option<&Entitlement>, now: Timestamp) -> AccessOutcome {
    let Some(entitlement) = entitlement else {
        return AccessOutcome::pure(AccessDecision::Preview);
    };

    // Completed batches leave time-based expiry behind: anyone who ever
    // paid keeps the content, everyone else is locked out.
    if batch.is_completed {
        if entitlement.has_ever_paid {
            return AccessOutcome::pure(AccessDecision::Full);
        }
        return AccessOutcome::pure(AccessDecision::CompletedLocked);
    }

    if !entitlement.is_current(now) {
        return AccessOutcome {
            decision: AccessDecision::RenewalRequired {
                price: batch.price,
                batch_name: batch.name.clone(),
            },
            flip_to_expired: entitlement.needs_expiry_flip(now),
        };
    }

    AccessOutcome::pure(AccessDecision::Full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::verifier::VerifiedPayment;
    use crate::domain::foundation::{
        AdminId, BatchId, EntitlementId, StudentId, TeacherId,
    };

    fn test_batch() -> Batch {
        Batch::new(
            BatchId::new(),
            "MATH-9",
            "Mathematics Grade 9",
            TeacherId::new(),
            25,
            500,
            Timestamp::now(),
        )
        .unwrap()
    }

    fn entitlement_for(batch: &Batch, now: Timestamp) -> Entitlement {
        Entitlement::grant(
            EntitlementId::new(),
            StudentId::new(),
            batch.id,
            &VerifiedPayment::assume_verified("order_1", "pay_1"),
            now,
            30,
        )
    }

    // ══════════════════════════════════════════════════════════════
    // Privilege Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn admin_is_privileged_everywhere() {
        let batch = test_batch();
        assert!(is_privileged(&Identity::Admin(AdminId::new()), &batch));
    }

    #[test]
    fn owning_teacher_is_privileged() {
        let batch = test_batch();
        assert!(is_privileged(&Identity::Teacher(batch.teacher), &batch));
    }

    #[test]
    fn other_teacher_is_not_privileged() {
        let batch = test_batch();
        assert!(!is_privileged(&Identity::Teacher(TeacherId::new()), &batch));
    }

    #[test]
    fn student_is_never_privileged() {
        let batch = test_batch();
        assert!(!is_privileged(&Identity::Student(StudentId::new()), &batch));
    }

    // ══════════════════════════════════════════════════════════════
    // Decision Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn no_entitlement_yields_preview() {
        let batch = test_batch();
        let outcome = decide(&batch, None, Timestamp::now());

        assert_eq!(outcome.decision, AccessDecision::Preview);
        assert!(!outcome.flip_to_expired);
    }

    #[test]
    fn active_window_yields_full() {
        let batch = test_batch();
        let now = Timestamp::now();
        let entitlement = entitlement_for(&batch, now);

        let outcome = decide(&batch, Some(&entitlement), now.add_days(10));

        assert_eq!(outcome.decision, AccessDecision::Full);
        assert!(!outcome.flip_to_expired);
    }

    #[test]
    fn passed_window_requires_renewal_with_price_and_name() {
        let batch = test_batch();
        let now = Timestamp::now();
        let entitlement = entitlement_for(&batch, now);

        let outcome = decide(&batch, Some(&entitlement), now.add_days(31));

        assert_eq!(
            outcome.decision,
            AccessDecision::RenewalRequired {
                price: 500,
                batch_name: "Mathematics Grade 9".to_string(),
            }
        );
        assert!(outcome.flip_to_expired);
    }

    #[test]
    fn already_flipped_entitlement_needs_no_second_flip() {
        let batch = test_batch();
        let now = Timestamp::now();
        let mut entitlement = entitlement_for(&batch, now);
        entitlement.mark_expired(now.add_days(31)).unwrap();

        let outcome = decide(&batch, Some(&entitlement), now.add_days(32));

        assert!(matches!(
            outcome.decision,
            AccessDecision::RenewalRequired { .. }
        ));
        assert!(!outcome.flip_to_expired);
    }

    #[test]
    fn completed_batch_with_paid_history_stays_full_forever() {
        let mut batch = test_batch();
        let now = Timestamp::now();
        let entitlement = entitlement_for(&batch, now);
        batch.complete(now.add_days(60));

        // Window is long gone, but the student paid once.
        let outcome = decide(&batch, Some(&entitlement), now.add_days(400));

        assert_eq!(outcome.decision, AccessDecision::Full);
        assert!(!outcome.flip_to_expired);
    }

    #[test]
    fn completed_batch_without_paid_history_is_locked() {
        let mut batch = test_batch();
        let now = Timestamp::now();
        let mut entitlement = entitlement_for(&batch, now);
        // Structurally possible even if no code path produces it today.
        entitlement.has_ever_paid = false;
        batch.complete(now.add_days(60));

        let outcome = decide(&batch, Some(&entitlement), now.add_days(61));

        assert_eq!(outcome.decision, AccessDecision::CompletedLocked);
    }

    #[test]
    fn completed_batch_without_entitlement_still_previews() {
        let mut batch = test_batch();
        batch.complete(Timestamp::now());

        let outcome = decide(&batch, None, Timestamp::now());

        assert_eq!(outcome.decision, AccessDecision::Preview);
    }

    #[test]
    fn decision_is_fresh_per_call() {
        let batch = test_batch();
        let now = Timestamp::now();
        let entitlement = entitlement_for(&batch, now);

        assert_eq!(
            decide(&batch, Some(&entitlement), now.add_days(10)).decision,
            AccessDecision::Full
        );
        assert!(matches!(
            decide(&batch, Some(&entitlement), now.add_days(40)).decision,
            AccessDecision::RenewalRequired { .. }
        ));
    }
}
