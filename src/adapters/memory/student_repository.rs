//! In-memory implementation of StudentRepository.

use crate::domain::foundation::{DomainError, StudentId};
use crate::domain::student::Student;
use crate::ports::StudentRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory student store.
#[derive(Default)]
pub struct InMemoryStudentRepository {
    students: Mutex<HashMap<StudentId, Student>>,
}

impl InMemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a student (test setup).
    pub fn put_student(&self, student: Student) {
        self.students.lock().unwrap().insert(student.id, student);
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, DomainError> {
        Ok(self.students.lock().unwrap().get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_returns_seeded_student() {
        let repo = InMemoryStudentRepository::new();
        let student = Student::new(StudentId::new(), "Asha", "9999900000").unwrap();
        let id = student.id;
        repo.put_student(student);

        assert!(repo.find_by_id(&id).await.unwrap().is_some());
        assert!(repo.find_by_id(&StudentId::new()).await.unwrap().is_none());
    }
}
