//! Domain models for the Pet Tracker backend.

pub mod alert;
pub mod location;
pub mod pet;
pub mod safe_zone;

pub use alert::{Alert, AlertKind, NewAlert};
pub use location::{LocationLog, LocationLogInput, SubmitPingRequest};
pub use pet::{Pet, PlanTier};
pub use safe_zone::{GeoPoint, SafeZone, ZoneShape};
