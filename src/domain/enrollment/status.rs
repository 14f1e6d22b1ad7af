//! Entitlement status state machine.
//!
//! The persisted status is a cached view of the time-based check
//! `now < expiry_date`. It is recomputed lazily when an entitlement is read
//! and flipped to `Expired` once the expiry instant has passed. A verified
//! renewal payment flips it back to `Active`.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Entitlement subscription status.
///
/// `Active` is not authoritative on its own: the decision engine always
/// compares the expiry date against the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementStatus {
    /// Paid and within the subscription window.
    Active,

    /// The subscription window has passed. Content is blocked unless the
    /// batch has completed and the student has ever paid.
    Expired,
}

impl EntitlementStatus {
    /// Returns true if this cached status claims access.
    pub fn is_active(&self) -> bool {
        matches!(self, EntitlementStatus::Active)
    }
}

impl StateMachine for EntitlementStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EntitlementStatus::*;
        matches!(
            (self, target),
            // Lazy expiry flip on read
            (Active, Expired)
            // Renewal before expiry refreshes the window
                | (Active, Active)
            // Renewal after expiry
                | (Expired, Active)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EntitlementStatus::*;
        match self {
            Active => vec![Expired, Active],
            Expired => vec![Active],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_can_expire() {
        let status = EntitlementStatus::Active;
        assert!(status.can_transition_to(&EntitlementStatus::Expired));

        let result = status.transition_to(EntitlementStatus::Expired);
        assert_eq!(result, Ok(EntitlementStatus::Expired));
    }

    #[test]
    fn active_can_renew_to_active() {
        let status = EntitlementStatus::Active;
        let result = status.transition_to(EntitlementStatus::Active);
        assert_eq!(result, Ok(EntitlementStatus::Active));
    }

    #[test]
    fn expired_can_reactivate_through_renewal() {
        let status = EntitlementStatus::Expired;
        let result = status.transition_to(EntitlementStatus::Active);
        assert_eq!(result, Ok(EntitlementStatus::Active));
    }

    #[test]
    fn expired_cannot_expire_again() {
        let status = EntitlementStatus::Expired;
        assert!(!status.can_transition_to(&EntitlementStatus::Expired));
    }

    #[test]
    fn no_status_is_terminal() {
        assert!(!EntitlementStatus::Active.is_terminal());
        assert!(!EntitlementStatus::Expired.is_terminal());
    }

    #[test]
    fn is_active_only_for_active() {
        assert!(EntitlementStatus::Active.is_active());
        assert!(!EntitlementStatus::Expired.is_active());
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&EntitlementStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&EntitlementStatus::Expired).unwrap(),
            "\"expired\""
        );
    }
}
