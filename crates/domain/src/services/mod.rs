//! Domain services for the Pet Tracker backend.
//!
//! Services contain the ingestion and geofence evaluation engine that
//! operates on domain models through the storage trait seams.

pub mod access;
pub mod alerts;
pub mod geofence;
pub mod geometry;
pub mod ingest;

pub use access::{PetDirectory, PlanAccessGate, PlanResolver};
pub use alerts::{AlertDispatcher, AlertStore};
pub use geofence::{GeofenceEvaluator, Membership, PetZoneState, ZoneTransition};
pub use ingest::{
    HistoryPage, HistoryQuery, IngestConfig, LocationIngestService, LocationStore,
    SafeZoneRegistry,
};
