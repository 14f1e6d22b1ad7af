//! Student repository port.

use crate::domain::foundation::{DomainError, StudentId};
use crate::domain::student::Student;
use async_trait::async_trait;

/// Repository port for student accounts.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Find a student by id.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, DomainError>;
}
