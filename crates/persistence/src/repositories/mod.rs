//! Repository implementations of the domain storage traits.

pub mod alert;
pub mod location_log;
pub mod pet;
pub mod safe_zone;
pub mod user;

pub use alert::AlertRepository;
pub use location_log::LocationLogRepository;
pub use pet::PetRepository;
pub use safe_zone::SafeZoneRepository;
pub use user::UserRepository;

use domain::error::StorageError;

/// Maps a database error into the domain storage error.
pub(crate) fn storage_error(err: sqlx::Error) -> StorageError {
    StorageError::Unavailable(err.to_string())
}
