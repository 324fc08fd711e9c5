//! Safe zone entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{SafeZone, ZoneShape};

/// Database row mapping for the safe_zones table. The shape column holds the
/// tagged JSON representation of the zone geometry.
#[derive(Debug, Clone, FromRow)]
pub struct SafeZoneEntity {
    pub id: i64,
    pub zone_id: Uuid,
    pub pet_id: Uuid,
    pub name: String,
    pub shape: serde_json::Value,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SafeZoneEntity {
    /// Converts the row into a domain zone. Returns `None` when the stored
    /// shape JSON does not deserialize; the caller decides how to report it.
    pub fn into_model(self) -> Option<SafeZone> {
        let shape: ZoneShape = serde_json::from_value(self.shape).ok()?;
        Some(SafeZone {
            id: self.id,
            zone_id: self.zone_id,
            pet_id: self.pet_id,
            name: self.name,
            shape,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
