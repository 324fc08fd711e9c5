//! Location log repository.
//!
//! Backs the append-only location history. Appends are idempotent on
//! `(pet_id, sequence)` so a redelivered ping maps onto its original row.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::error::StorageError;
use domain::models::{LocationLog, LocationLogInput};
use domain::services::{HistoryQuery, LocationStore};

use crate::entities::LocationLogEntity;
use crate::repositories::storage_error;

const LOG_COLUMNS: &str =
    "id, pet_id, latitude, longitude, accuracy, battery, recorded_at, sequence";

/// Helper for building the dynamic WHERE clause of a history query.
/// Tracks conditions and parameter positions to avoid code duplication.
struct HistoryFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl HistoryFilterBuilder {
    fn build(query: &HistoryQuery) -> Self {
        let mut conditions = vec!["pet_id = $1".to_string()];
        let mut param_count = 1;

        if query.from.is_some() {
            param_count += 1;
            conditions.push(format!("recorded_at >= ${}", param_count));
        }

        if query.to.is_some() {
            param_count += 1;
            conditions.push(format!("recorded_at <= ${}", param_count));
        }

        if query.cursor.is_some() {
            conditions.push(format!(
                "(recorded_at, sequence) > (${}, ${})",
                param_count + 1,
                param_count + 2
            ));
            param_count += 2;
        }

        Self {
            conditions,
            param_count,
        }
    }

    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }
}

/// Repository for location log database operations.
#[derive(Clone)]
pub struct LocationLogRepository {
    pool: PgPool,
}

impl LocationLogRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for LocationLogRepository {
    async fn append(&self, input: &LocationLogInput) -> Result<LocationLog, StorageError> {
        let inserted = sqlx::query_as::<_, LocationLogEntity>(&format!(
            r#"
            INSERT INTO location_logs (pet_id, latitude, longitude, accuracy, battery, recorded_at, sequence)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (pet_id, sequence) DO NOTHING
            RETURNING {}
            "#,
            LOG_COLUMNS
        ))
        .bind(input.pet_id)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.accuracy)
        .bind(input.battery)
        .bind(input.recorded_at)
        .bind(input.sequence)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        if let Some(entity) = inserted {
            return Ok(entity.into());
        }

        // Conflict: the sequence was already recorded, return the stored row.
        let existing = sqlx::query_as::<_, LocationLogEntity>(&format!(
            "SELECT {} FROM location_logs WHERE pet_id = $1 AND sequence = $2",
            LOG_COLUMNS
        ))
        .bind(input.pet_id)
        .bind(input.sequence)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(existing.into())
    }

    async fn latest(&self, pet_id: Uuid) -> Result<Option<LocationLog>, StorageError> {
        let entity = sqlx::query_as::<_, LocationLogEntity>(&format!(
            r#"
            SELECT {}
            FROM location_logs
            WHERE pet_id = $1
            ORDER BY recorded_at DESC, sequence DESC
            LIMIT 1
            "#,
            LOG_COLUMNS
        ))
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(entity.map(Into::into))
    }

    async fn range(&self, query: &HistoryQuery) -> Result<(Vec<LocationLog>, bool), StorageError> {
        let filter = HistoryFilterBuilder::build(query);
        let sql = format!(
            r#"
            SELECT {}
            FROM location_logs
            WHERE {}
            ORDER BY recorded_at ASC, sequence ASC
            LIMIT ${}
            "#,
            LOG_COLUMNS,
            filter.where_clause(),
            filter.param_count + 1
        );

        let mut builder = sqlx::query_as::<_, LocationLogEntity>(&sql).bind(query.pet_id);
        if let Some(from) = query.from {
            builder = builder.bind(from);
        }
        if let Some(to) = query.to {
            builder = builder.bind(to);
        }
        if let Some((ts, seq)) = query.cursor {
            builder = builder.bind(ts).bind(seq);
        }

        // Fetch one extra row to detect whether another page exists.
        let mut entities = builder
            .bind(query.limit + 1)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        let has_more = entities.len() as i64 > query.limit;
        entities.truncate(query.limit as usize);

        Ok((entities.into_iter().map(Into::into).collect(), has_more))
    }
}
