//! Geofence evaluator: per-pet membership state machine with count-based
//! debouncing.
//!
//! GPS fixes jitter at zone boundaries, so a raw membership flip is confirmed
//! only after a configurable number of consecutive agreeing pings. The
//! debounce is count-based rather than time-based on purpose: devices ping at
//! irregular intervals and the policy must degrade gracefully.
//!
//! This module owns the only mutable cross-ping state in the engine. It has
//! no internal locking; the caller serializes evaluation per pet and feeds
//! pings strictly in the order the ingest service assigned them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::safe_zone::{GeoPoint, SafeZone};
use crate::services::geometry;

/// A pet's membership relative to one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Inside,
    Outside,
    /// No evaluated ping yet for this zone.
    Unknown,
}

impl Membership {
    pub fn as_str(&self) -> &'static str {
        match self {
            Membership::Inside => "inside",
            Membership::Outside => "outside",
            Membership::Unknown => "unknown",
        }
    }
}

/// A confirmed change of membership for one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneTransition {
    pub zone_id: Uuid,
    pub from: Membership,
    pub to: Membership,
}

/// Debounce state for one pet x one zone.
#[derive(Debug, Clone)]
struct ZoneMembershipState {
    confirmed: Membership,
    last_change_at: Option<DateTime<Utc>>,
    /// Candidate new membership awaiting confirmation, with the count of
    /// consecutive pings that agreed with it.
    pending: Option<(Membership, u32)>,
}

impl Default for ZoneMembershipState {
    fn default() -> Self {
        Self {
            confirmed: Membership::Unknown,
            last_change_at: None,
            pending: None,
        }
    }
}

/// All zone states for one pet. Owned by the pet's pipeline entry; the
/// evaluator mutates it one ping at a time.
#[derive(Debug, Clone, Default)]
pub struct PetZoneState {
    zones: HashMap<Uuid, ZoneMembershipState>,
}

impl PetZoneState {
    /// Confirmed membership for a zone, `Unknown` if never evaluated.
    pub fn membership(&self, zone_id: Uuid) -> Membership {
        self.zones
            .get(&zone_id)
            .map(|z| z.confirmed)
            .unwrap_or(Membership::Unknown)
    }

    /// When the zone's confirmed membership last changed.
    pub fn last_change_at(&self, zone_id: Uuid) -> Option<DateTime<Utc>> {
        self.zones.get(&zone_id).and_then(|z| z.last_change_at)
    }
}

/// Evaluates pings against a pet's active safe zones.
#[derive(Debug, Clone)]
pub struct GeofenceEvaluator {
    confirmation_pings: u32,
}

impl GeofenceEvaluator {
    /// Creates an evaluator that confirms a transition after
    /// `confirmation_pings` consecutive agreeing pings (minimum 1).
    pub fn new(confirmation_pings: u32) -> Self {
        Self {
            confirmation_pings: confirmation_pings.max(1),
        }
    }

    /// Evaluates one ping against the current active zone set and returns the
    /// confirmed transitions.
    ///
    /// The zone set may change between calls (zones are edited externally);
    /// state for zones absent from `zones` is retained but not evaluated, so
    /// debouncing resumes if a zone comes back. The very first evaluated ping
    /// for a zone initializes its state silently - no transition is emitted.
    pub fn evaluate(
        &self,
        state: &mut PetZoneState,
        point: &GeoPoint,
        zones: &[SafeZone],
        observed_at: DateTime<Utc>,
    ) -> Vec<ZoneTransition> {
        let mut transitions = Vec::new();

        for zone in zones {
            if !zone.active || !zone.shape.is_well_formed() {
                continue;
            }

            let raw = if geometry::shape_contains(&zone.shape, point) {
                Membership::Inside
            } else {
                Membership::Outside
            };

            let entry = state.zones.entry(zone.zone_id).or_default();

            if entry.confirmed == Membership::Unknown {
                // First observation: adopt the raw membership directly.
                entry.confirmed = raw;
                entry.last_change_at = Some(observed_at);
                entry.pending = None;
                continue;
            }

            if raw == entry.confirmed {
                // Agreement with the confirmed state breaks any pending streak.
                entry.pending = None;
                continue;
            }

            let count = match entry.pending {
                Some((candidate, count)) if candidate == raw => count + 1,
                _ => 1,
            };

            if count >= self.confirmation_pings {
                transitions.push(ZoneTransition {
                    zone_id: zone.zone_id,
                    from: entry.confirmed,
                    to: raw,
                });
                entry.confirmed = raw;
                entry.last_change_at = Some(observed_at);
                entry.pending = None;
            } else {
                entry.pending = Some((raw, count));
            }
        }

        transitions
    }
}
