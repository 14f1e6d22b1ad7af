//! In-memory adapters for tests and local development.

mod batch_repository;
mod entitlement_repository;
mod student_repository;

pub use batch_repository::InMemoryBatchRepository;
pub use entitlement_repository::InMemoryEntitlementRepository;
pub use student_repository::InMemoryStudentRepository;
