//! Safe zone (geofence) domain model.
//!
//! Zones are created and edited by the external CRUD system; this backend
//! consumes them read-only through the `SafeZoneRegistry` seam.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Geometry of a safe zone.
///
/// A polygon's vertex list is treated as a closed ring: the first and last
/// vertices are implicitly connected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ZoneShape {
    #[serde(rename_all = "camelCase")]
    Circle {
        center: GeoPoint,
        radius_meters: f64,
    },
    Polygon {
        vertices: Vec<GeoPoint>,
    },
}

impl ZoneShape {
    /// Checks the structural constraints on a shape read from storage.
    pub fn is_well_formed(&self) -> bool {
        match self {
            ZoneShape::Circle { radius_meters, .. } => {
                *radius_meters > 0.0 && radius_meters.is_finite()
            }
            ZoneShape::Polygon { vertices } => vertices.len() >= 3,
        }
    }
}

/// A named safe zone associated with one pet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeZone {
    pub id: i64,
    pub zone_id: Uuid,
    pub pet_id: Uuid,
    pub name: String,
    pub shape: ZoneShape,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
