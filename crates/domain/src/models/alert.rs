//! Alert domain model.
//!
//! Alerts are produced by the dispatcher and appended to an outbox that the
//! external delivery transport (push/SMS) drains. Never mutated after
//! creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of alert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ZoneExit,
    ZoneEnter,
    LowBattery,
}

impl AlertKind {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::ZoneExit => "zone_exit",
            AlertKind::ZoneEnter => "zone_enter",
            AlertKind::LowBattery => "low_battery",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "zone_exit" => Some(AlertKind::ZoneExit),
            "zone_enter" => Some(AlertKind::ZoneEnter),
            "low_battery" => Some(AlertKind::LowBattery),
            _ => None,
        }
    }
}

/// A persisted alert record.
///
/// The dedupe key is `(pet_id, kind, zone_id)`; no two alerts sharing it are
/// created within the configured cooldown window. `zone_id` is present for
/// zone kinds and absent for battery alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: i64,
    pub alert_id: Uuid,
    pub pet_id: Uuid,
    pub kind: AlertKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an alert (identity assigned by the store).
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub pet_id: Uuid,
    pub kind: AlertKind,
    pub zone_id: Option<Uuid>,
}

/// Query parameters for the alert listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlertsQuery {
    /// Only return alerts created at or after this time (ms since epoch).
    pub since: Option<i64>,

    /// Maximum number of alerts to return (1-100, default 50).
    pub limit: Option<i64>,
}

impl ListAlertsQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 100;

    /// Returns the effective limit, clamped to valid range.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

/// Response payload for the alert listing endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlertsResponse {
    pub alerts: Vec<Alert>,
    pub total: usize,
}
