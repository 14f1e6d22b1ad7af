//! PostgreSQL implementation of IdentityResolver.
//!
//! One role-tagged lookup per resolution: the role claim picks the table,
//! and a single existence query settles the identity. No fallthrough
//! probing across account stores.

use crate::domain::foundation::{
    AdminId, AuthPrincipal, DomainError, ErrorCode, Identity, Role, StudentId, TeacherId,
};
use crate::ports::IdentityResolver;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the IdentityResolver port.
pub struct PostgresIdentityResolver {
    pool: PgPool,
}

impl PostgresIdentityResolver {
    /// Creates a new resolver with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, table: &str, id: &Uuid) -> Result<bool, DomainError> {
        // Table name comes from a fixed match below, never from input.
        let query = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table);
        let (found,): (bool,) = sqlx::query_as(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to resolve identity: {}", e),
                )
            })?;
        Ok(found)
    }
}

#[async_trait]
impl IdentityResolver for PostgresIdentityResolver {
    async fn resolve(&self, principal: &AuthPrincipal) -> Result<Option<Identity>, DomainError> {
        let identity = match principal.role {
            Role::Student => self
                .exists("students", &principal.subject)
                .await?
                .then(|| Identity::Student(StudentId::from_uuid(principal.subject))),
            Role::Teacher => self
                .exists("teachers", &principal.subject)
                .await?
                .then(|| Identity::Teacher(TeacherId::from_uuid(principal.subject))),
            Role::Admin => self
                .exists("admins", &principal.subject)
                .await?
                .then(|| Identity::Admin(AdminId::from_uuid(principal.subject))),
        };

        Ok(identity)
    }
}
