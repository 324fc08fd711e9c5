//! Alert repository.
//!
//! The alerts table doubles as the delivery outbox; the push/SMS transport
//! drains it outside this service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::error::StorageError;
use domain::models::{Alert, AlertKind, NewAlert};
use domain::services::AlertStore;

use crate::entities::AlertEntity;
use crate::repositories::storage_error;

const ALERT_COLUMNS: &str = "id, alert_id, pet_id, kind, zone_id, created_at";

/// Repository for alert database operations.
#[derive(Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for AlertRepository {
    async fn insert(&self, alert: &NewAlert) -> Result<Alert, StorageError> {
        let entity = sqlx::query_as::<_, AlertEntity>(&format!(
            r#"
            INSERT INTO alerts (pet_id, kind, zone_id)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            ALERT_COLUMNS
        ))
        .bind(alert.pet_id)
        .bind(alert.kind.as_str())
        .bind(alert.zone_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        entity
            .into_model()
            .ok_or_else(|| StorageError::Unavailable("Inserted alert has unknown kind".to_string()))
    }

    async fn exists_since(
        &self,
        pet_id: Uuid,
        kind: AlertKind,
        zone_id: Option<Uuid>,
        since: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM alerts
                WHERE pet_id = $1
                  AND kind = $2
                  AND zone_id IS NOT DISTINCT FROM $3
                  AND created_at >= $4
            )
            "#,
        )
        .bind(pet_id)
        .bind(kind.as_str())
        .bind(zone_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(exists)
    }

    async fn list_for_pet(
        &self,
        pet_id: Uuid,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Alert>, StorageError> {
        let entities = if let Some(since) = since {
            sqlx::query_as::<_, AlertEntity>(&format!(
                r#"
                SELECT {}
                FROM alerts
                WHERE pet_id = $1 AND created_at >= $2
                ORDER BY created_at DESC, id DESC
                LIMIT $3
                "#,
                ALERT_COLUMNS
            ))
            .bind(pet_id)
            .bind(since)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?
        } else {
            sqlx::query_as::<_, AlertEntity>(&format!(
                r#"
                SELECT {}
                FROM alerts
                WHERE pet_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2
                "#,
                ALERT_COLUMNS
            ))
            .bind(pet_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?
        };

        Ok(entities
            .into_iter()
            .filter_map(AlertEntity::into_model)
            .collect())
    }
}
