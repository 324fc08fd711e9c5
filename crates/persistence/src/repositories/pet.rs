//! Pet repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::error::StorageError;
use domain::models::Pet;
use domain::services::PetDirectory;

use crate::entities::PetEntity;
use crate::repositories::storage_error;

/// Repository for pet lookups. Pet records are written by the external CRUD
/// system; this side only reads them.
#[derive(Clone)]
pub struct PetRepository {
    pool: PgPool,
}

impl PetRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PetDirectory for PetRepository {
    async fn find_pet(&self, pet_id: Uuid) -> Result<Option<Pet>, StorageError> {
        let entity = sqlx::query_as::<_, PetEntity>(
            "SELECT id, pet_id, owner_user_id, name, created_at FROM pets WHERE pet_id = $1",
        )
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(entity.map(Into::into))
    }
}
