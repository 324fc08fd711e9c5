//! Alert entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{Alert, AlertKind};

/// Database row mapping for the alerts table.
#[derive(Debug, Clone, FromRow)]
pub struct AlertEntity {
    pub id: i64,
    pub alert_id: Uuid,
    pub pet_id: Uuid,
    pub kind: String,
    pub zone_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl AlertEntity {
    /// Converts the row into a domain alert. Returns `None` for rows with an
    /// unrecognized kind, which can appear after a rollback.
    pub fn into_model(self) -> Option<Alert> {
        let kind = AlertKind::parse(&self.kind)?;
        Some(Alert {
            id: self.id,
            alert_id: self.alert_id,
            pet_id: self.pet_id,
            kind,
            zone_id: self.zone_id,
            created_at: self.created_at,
        })
    }
}
