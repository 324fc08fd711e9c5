//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod alert;
pub mod location_log;
pub mod pet;
pub mod safe_zone;
pub mod user;

pub use alert::AlertEntity;
pub use location_log::LocationLogEntity;
pub use pet::PetEntity;
pub use safe_zone::SafeZoneEntity;
pub use user::UserEntity;
