//! PostgreSQL implementation of StudentRepository.

use crate::domain::foundation::{DomainError, ErrorCode, StudentId, Timestamp};
use crate::domain::student::Student;
use crate::ports::StudentRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the StudentRepository port.
pub struct PostgresStudentRepository {
    pool: PgPool,
}

impl PostgresStudentRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StudentRow {
    id: Uuid,
    name: String,
    phone: String,
    created_at: DateTime<Utc>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: StudentId::from_uuid(row.id),
            name: row.name,
            phone: row.phone,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl StudentRepository for PostgresStudentRepository {
    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, DomainError> {
        let row: Option<StudentRow> = sqlx::query_as(
            r#"
            SELECT id, name, phone, created_at
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find student: {}", e),
            )
        })?;

        Ok(row.map(Student::from))
    }
}
