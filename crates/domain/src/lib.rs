//! Domain layer for the Pet Tracker backend.
//!
//! This crate contains:
//! - Domain models (Pet, LocationLog, SafeZone, Alert)
//! - The location ingestion and geofence evaluation engine
//! - Storage trait seams implemented by the persistence crate
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;
