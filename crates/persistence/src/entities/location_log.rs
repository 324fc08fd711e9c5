//! Location log entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::LocationLog;

/// Database row mapping for the location_logs table.
#[derive(Debug, Clone, FromRow)]
pub struct LocationLogEntity {
    pub id: i64,
    pub pet_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub battery: Option<i32>,
    pub recorded_at: DateTime<Utc>,
    pub sequence: i64,
}

impl From<LocationLogEntity> for LocationLog {
    fn from(entity: LocationLogEntity) -> Self {
        Self {
            id: entity.id,
            pet_id: entity.pet_id,
            latitude: entity.latitude,
            longitude: entity.longitude,
            accuracy: entity.accuracy,
            battery: entity.battery,
            recorded_at: entity.recorded_at,
            sequence: entity.sequence,
        }
    }
}
