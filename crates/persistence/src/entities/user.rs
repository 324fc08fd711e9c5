//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::PlanTier;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub email: String,
    pub plan_tier: String,
    pub created_at: DateTime<Utc>,
}

impl UserEntity {
    /// Parses the stored plan tier, treating unknown values as free.
    pub fn plan(&self) -> PlanTier {
        PlanTier::parse(&self.plan_tier).unwrap_or(PlanTier::Free)
    }
}
