//! Pet entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::Pet;

/// Database row mapping for the pets table.
#[derive(Debug, Clone, FromRow)]
pub struct PetEntity {
    pub id: i64,
    pub pet_id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<PetEntity> for Pet {
    fn from(entity: PetEntity) -> Self {
        Self {
            id: entity.id,
            pet_id: entity.pet_id,
            owner_user_id: entity.owner_user_id,
            name: entity.name,
            created_at: entity.created_at,
        }
    }
}
