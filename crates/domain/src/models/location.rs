//! Location domain model.
//!
//! A raw `SubmitPingRequest` is validated at the boundary and converted into
//! an immutable `LocationLog` with a server-assigned timestamp and per-pet
//! sequence number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A persisted, append-only location record.
///
/// `recorded_at` is assigned at ingestion and is monotonically non-decreasing
/// per pet; `sequence` is strictly increasing per pet and breaks timestamp
/// ties. Never mutated once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationLog {
    pub id: i64,
    pub pet_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<i32>,
    pub recorded_at: DateTime<Utc>,
    pub sequence: i64,
}

/// Input for appending a location log (identity assigned by the store).
#[derive(Debug, Clone)]
pub struct LocationLogInput {
    pub pet_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub battery: Option<i32>,
    pub recorded_at: DateTime<Utc>,
    pub sequence: i64,
}

/// Request payload for submitting a GPS ping.
///
/// POST /api/v1/locations
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPingRequest {
    pub pet_id: Uuid,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    #[validate(custom(function = "shared::validation::validate_accuracy"))]
    pub accuracy: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_battery"))]
    pub battery: Option<i32>,

    /// Client-supplied capture timestamp in milliseconds since epoch.
    /// Optional; the server timestamp is authoritative either way.
    pub timestamp: Option<i64>,
}

/// Query parameters for the location history endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetHistoryQuery {
    /// Opaque cursor for pagination (base64-encoded timestamp:sequence).
    pub cursor: Option<String>,

    /// Number of results per page (1-100, default 50).
    pub limit: Option<i64>,

    /// Start timestamp filter, inclusive (milliseconds since epoch).
    pub from: Option<i64>,

    /// End timestamp filter, inclusive (milliseconds since epoch).
    pub to: Option<i64>,
}

impl GetHistoryQuery {
    /// Default limit for history queries.
    pub const DEFAULT_LIMIT: i64 = 50;
    /// Maximum limit for history queries.
    pub const MAX_LIMIT: i64 = 100;
    /// Minimum limit for history queries.
    pub const MIN_LIMIT: i64 = 1;

    /// Returns the effective limit, clamped to valid range.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(Self::MIN_LIMIT, Self::MAX_LIMIT)
    }
}

/// Pagination info for cursor-based pagination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    /// Cursor for fetching the next page.
    pub next_cursor: Option<String>,
    /// Whether there are more results available.
    pub has_more: bool,
}

/// Response payload for the location history endpoint.
///
/// Entries are ordered ascending by `(recorded_at, sequence)`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub locations: Vec<LocationLog>,
    pub pagination: PaginationInfo,
}
