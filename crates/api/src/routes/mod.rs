//! HTTP route handlers.

pub mod alerts;
pub mod health;
pub mod locations;
