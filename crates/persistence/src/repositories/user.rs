//! User repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::error::StorageError;
use domain::models::PlanTier;
use domain::services::PlanResolver;

use crate::entities::UserEntity;
use crate::repositories::storage_error;

/// Repository for user plan lookups. The billing system owns the plan_tier
/// column; it is read fresh on every authorization check.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanResolver for UserRepository {
    async fn resolve_user_plan(&self, user_id: Uuid) -> Result<Option<PlanTier>, StorageError> {
        let entity = sqlx::query_as::<_, UserEntity>(
            "SELECT id, user_id, email, plan_tier, created_at FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(entity.map(|u| u.plan()))
    }
}
