//! PostgreSQL implementation of EntitlementRepository.
//!
//! The unique index on (student_id, batch_id) is what makes concurrent
//! renewal safe: a second concurrent insert fails with a constraint
//! violation that this adapter reports as `EntitlementExists`, distinctly
//! from "not found", so the reconciler can retry it as an update.

use crate::domain::enrollment::{Entitlement, EntitlementStatus};
use crate::domain::foundation::{
    BatchId, DomainError, EntitlementId, ErrorCode, StudentId, Timestamp,
};
use crate::ports::EntitlementRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Name of the unique index on the (student_id, batch_id) pair.
const PAIR_CONSTRAINT: &str = "entitlements_student_id_batch_id_key";

/// PostgreSQL implementation of the EntitlementRepository port.
pub struct PostgresEntitlementRepository {
    pool: PgPool,
}

impl PostgresEntitlementRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an entitlement.
#[derive(Debug, sqlx::FromRow)]
struct EntitlementRow {
    id: Uuid,
    student_id: Uuid,
    batch_id: Uuid,
    start_date: DateTime<Utc>,
    expiry_date: DateTime<Utc>,
    status: String,
    has_ever_paid: bool,
    payment_id: String,
    order_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EntitlementRow> for Entitlement {
    type Error = DomainError;

    fn try_from(row: EntitlementRow) -> Result<Self, Self::Error> {
        Ok(Entitlement {
            id: EntitlementId::from_uuid(row.id),
            student_id: StudentId::from_uuid(row.student_id),
            batch_id: BatchId::from_uuid(row.batch_id),
            start_date: Timestamp::from_datetime(row.start_date),
            expiry_date: Timestamp::from_datetime(row.expiry_date),
            status: parse_status(&row.status)?,
            has_ever_paid: row.has_ever_paid,
            payment_id: row.payment_id,
            order_id: row.order_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<EntitlementStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "active" => Ok(EntitlementStatus::Active),
        "expired" => Ok(EntitlementStatus::Expired),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid status value: {}", s),
        )),
    }
}

fn status_to_string(status: &EntitlementStatus) -> &'static str {
    match status {
        EntitlementStatus::Active => "active",
        EntitlementStatus::Expired => "expired",
    }
}

#[async_trait]
impl EntitlementRepository for PostgresEntitlementRepository {
    async fn insert(&self, entitlement: &Entitlement) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO entitlements (
                id, student_id, batch_id, start_date, expiry_date, status,
                has_ever_paid, payment_id, order_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(entitlement.id.as_uuid())
        .bind(entitlement.student_id.as_uuid())
        .bind(entitlement.batch_id.as_uuid())
        .bind(entitlement.start_date.as_datetime())
        .bind(entitlement.expiry_date.as_datetime())
        .bind(status_to_string(&entitlement.status))
        .bind(entitlement.has_ever_paid)
        .bind(&entitlement.payment_id)
        .bind(&entitlement.order_id)
        .bind(entitlement.created_at.as_datetime())
        .bind(entitlement.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some(PAIR_CONSTRAINT) {
                    return DomainError::new(
                        ErrorCode::EntitlementExists,
                        "Entitlement already exists for this (student, batch) pair",
                    );
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert entitlement: {}", e),
            )
        })?;

        Ok(())
    }

    async fn update(&self, entitlement: &Entitlement) -> Result<(), DomainError> {
        // has_ever_paid is sticky: OR with the stored value, never overwrite.
        let result = sqlx::query(
            r#"
            UPDATE entitlements SET
                start_date = $2,
                expiry_date = $3,
                status = $4,
                has_ever_paid = has_ever_paid OR $5,
                payment_id = $6,
                order_id = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(entitlement.id.as_uuid())
        .bind(entitlement.start_date.as_datetime())
        .bind(entitlement.expiry_date.as_datetime())
        .bind(status_to_string(&entitlement.status))
        .bind(entitlement.has_ever_paid)
        .bind(&entitlement.payment_id)
        .bind(&entitlement.order_id)
        .bind(entitlement.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update entitlement: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::EntitlementNotFound,
                "Entitlement not found",
            ));
        }

        Ok(())
    }

    async fn find_by_pair(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
    ) -> Result<Option<Entitlement>, DomainError> {
        let row: Option<EntitlementRow> = sqlx::query_as(
            r#"
            SELECT id, student_id, batch_id, start_date, expiry_date, status,
                   has_ever_paid, payment_id, order_id, created_at, updated_at
            FROM entitlements
            WHERE student_id = $1 AND batch_id = $2
            "#,
        )
        .bind(student_id.as_uuid())
        .bind(batch_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find entitlement: {}", e),
            )
        })?;

        row.map(Entitlement::try_from).transpose()
    }

    async fn expire_overdue(&self, now: Timestamp) -> Result<u64, DomainError> {
        // Single statement; rows flipped concurrently by the lazy read
        // path simply no longer match the predicate.
        let result = sqlx::query(
            r#"
            UPDATE entitlements
            SET status = 'expired', updated_at = $1
            WHERE status = 'active' AND expiry_date < $1
            "#,
        )
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to expire overdue entitlements: {}", e),
            )
        })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_works_for_all_values() {
        assert_eq!(parse_status("active").unwrap(), EntitlementStatus::Active);
        assert_eq!(parse_status("expired").unwrap(), EntitlementStatus::Expired);
        assert_eq!(parse_status("ACTIVE").unwrap(), EntitlementStatus::Active);
    }

    #[test]
    fn parse_status_rejects_invalid_values() {
        assert!(parse_status("pending").is_err());
        assert!(parse_status("").is_err());
    }

    #[test]
    fn roundtrip_status_conversion() {
        for status in [EntitlementStatus::Active, EntitlementStatus::Expired] {
            let s = status_to_string(&status);
            assert_eq!(parse_status(s).unwrap(), status);
        }
    }
}
