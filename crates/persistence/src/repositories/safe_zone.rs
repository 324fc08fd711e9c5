//! Safe zone repository.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use domain::error::StorageError;
use domain::models::SafeZone;
use domain::services::SafeZoneRegistry;

use crate::entities::SafeZoneEntity;
use crate::repositories::storage_error;

/// Repository for safe zone lookups. Zones are created and edited by the
/// external CRUD system; the engine reads the active set per pet.
#[derive(Clone)]
pub struct SafeZoneRepository {
    pool: PgPool,
}

impl SafeZoneRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SafeZoneRegistry for SafeZoneRepository {
    async fn list_active_zones(&self, pet_id: Uuid) -> Result<Vec<SafeZone>, StorageError> {
        let entities = sqlx::query_as::<_, SafeZoneEntity>(
            r#"
            SELECT id, zone_id, pet_id, name, shape, active, created_at, updated_at
            FROM safe_zones
            WHERE pet_id = $1 AND active = TRUE
            ORDER BY created_at ASC
            "#,
        )
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        // Rows with undeserializable shape JSON are dropped, not fatal.
        let zones = entities
            .into_iter()
            .filter_map(|entity| {
                let zone_id = entity.zone_id;
                let zone = entity.into_model();
                if zone.is_none() {
                    warn!(zone_id = %zone_id, "Dropping safe zone with malformed shape JSON");
                }
                zone
            })
            .collect();

        Ok(zones)
    }
}
