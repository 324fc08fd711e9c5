//! Pet domain model.
//!
//! Pet lifecycle (creation, profile editing, deletion) is owned by the
//! external CRUD system; this backend only reads the identity and ownership
//! needed to gate and attribute location data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked pet as seen by the location subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i64,
    pub pet_id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Subscription tier of a pet's owning user.
///
/// Live location ingestion and queries are gated to paid tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Premium,
    Family,
}

impl PlanTier {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Premium => "premium",
            PlanTier::Family => "family",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(PlanTier::Free),
            "premium" => Some(PlanTier::Premium),
            "family" => Some(PlanTier::Family),
            _ => None,
        }
    }

    /// Whether this tier includes the live location feature.
    pub fn includes_live_location(&self) -> bool {
        !matches!(self, PlanTier::Free)
    }
}
