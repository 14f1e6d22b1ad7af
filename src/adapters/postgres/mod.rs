//! PostgreSQL adapters.
//!
//! sqlx-backed implementations of the persistence ports. The pool is
//! injected per repository; there is no process-wide connection.

mod batch_repository;
mod entitlement_repository;
mod identity_resolver;
mod student_repository;

pub use batch_repository::PostgresBatchRepository;
pub use entitlement_repository::PostgresEntitlementRepository;
pub use identity_resolver::PostgresIdentityResolver;
pub use student_repository::PostgresStudentRepository;
