//! PostgreSQL implementation of BatchRepository.
//!
//! `batch_students` is the one membership relation; roster and
//! enrolled-batch listings are both queries over it. Membership adds go
//! through `INSERT .. ON CONFLICT DO NOTHING` so concurrent renewals for
//! the same pair can never double-append.

use crate::domain::batch::{Batch, BatchMessage, ClassSession};
use crate::domain::foundation::{BatchId, DomainError, ErrorCode, StudentId, TeacherId, Timestamp};
use crate::ports::{BatchRepository, BatchSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the BatchRepository port.
pub struct PostgresBatchRepository {
    pool: PgPool,
}

impl PostgresBatchRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BatchRow {
    id: Uuid,
    code: String,
    name: String,
    description: String,
    capacity: i32,
    price: i64,
    teacher_id: Uuid,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    syllabus: Vec<String>,
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ClassRow {
    title: String,
    link: String,
    scheduled_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    teacher_id: Uuid,
    body: String,
    sent_at: DateTime<Utc>,
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl BatchRepository for PostgresBatchRepository {
    async fn find_by_id(&self, id: &BatchId) -> Result<Option<Batch>, DomainError> {
        let row: Option<BatchRow> = sqlx::query_as(
            r#"
            SELECT id, code, name, description, capacity, price, teacher_id,
                   start_date, end_date, syllabus, is_completed, completed_at,
                   created_at, updated_at
            FROM batches
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find batch", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let classes: Vec<ClassRow> = sqlx::query_as(
            r#"
            SELECT title, link, scheduled_at
            FROM batch_classes
            WHERE batch_id = $1
            ORDER BY scheduled_at
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load batch classes", e))?;

        let messages: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT teacher_id, body, sent_at
            FROM batch_messages
            WHERE batch_id = $1
            ORDER BY sent_at
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load batch messages", e))?;

        Ok(Some(Batch {
            id: BatchId::from_uuid(row.id),
            code: row.code,
            name: row.name,
            description: row.description,
            capacity: row.capacity.max(0) as u32,
            price: row.price,
            teacher: TeacherId::from_uuid(row.teacher_id),
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: row.end_date.map(Timestamp::from_datetime),
            syllabus: row.syllabus,
            classes: classes
                .into_iter()
                .map(|c| ClassSession {
                    title: c.title,
                    link: c.link,
                    scheduled_at: Timestamp::from_datetime(c.scheduled_at),
                })
                .collect(),
            messages: messages
                .into_iter()
                .map(|m| BatchMessage {
                    sender: TeacherId::from_uuid(m.teacher_id),
                    body: m.body,
                    sent_at: Timestamp::from_datetime(m.sent_at),
                })
                .collect(),
            is_completed: row.is_completed,
            completed_at: row.completed_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }))
    }

    async fn add_member(
        &self,
        batch_id: &BatchId,
        student_id: &StudentId,
    ) -> Result<bool, DomainError> {
        // Set semantics at the store: the conflict target is the primary
        // key (batch_id, student_id), so a concurrent duplicate add is a
        // no-op rather than a race.
        let result = sqlx::query(
            r#"
            INSERT INTO batch_students (batch_id, student_id, enrolled_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (batch_id, student_id) DO NOTHING
            "#,
        )
        .bind(batch_id.as_uuid())
        .bind(student_id.as_uuid())
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to add batch member", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn roster(&self, batch_id: &BatchId) -> Result<Vec<StudentId>, DomainError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT student_id
            FROM batch_students
            WHERE batch_id = $1
            ORDER BY enrolled_at
            "#,
        )
        .bind(batch_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load roster", e))?;

        Ok(rows
            .into_iter()
            .map(|(id,)| StudentId::from_uuid(id))
            .collect())
    }

    async fn enrolled_batches(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<BatchSummary>, DomainError> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT b.id, b.name
            FROM batches b
            JOIN batch_students bs ON bs.batch_id = b.id
            WHERE bs.student_id = $1
            ORDER BY bs.enrolled_at
            "#,
        )
        .bind(student_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load enrolled batches", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| BatchSummary {
                id: BatchId::from_uuid(id),
                name,
            })
            .collect())
    }
}
