//! Student entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StudentId, Timestamp, ValidationError};

/// A student account. Enrollment is not stored here: the batches a student
/// belongs to are a projection of the membership relation in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier for this student.
    pub id: StudentId,

    /// Display name.
    pub name: String,

    /// Contact phone, unique per account.
    pub phone: String,

    /// When the account was created.
    pub created_at: Timestamp,
}

impl Student {
    /// Create a new student.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if name or phone is empty.
    pub fn new(
        id: StudentId,
        name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let phone = phone.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if phone.trim().is_empty() {
            return Err(ValidationError::empty_field("phone"));
        }

        Ok(Self {
            id,
            name,
            phone,
            created_at: Timestamp::now(),
        })
    }
}
