//! Foundation types shared across the domain.
//!
//! Value objects, identifiers, error types, and small traits that the
//! rest of the domain builds on.

mod errors;
mod identity;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use identity::{AuthError, AuthPrincipal, Identity, Role};
pub use ids::{AdminId, BatchId, EntitlementId, StudentId, TeacherId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
