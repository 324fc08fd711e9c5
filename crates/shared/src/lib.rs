//! Shared utilities and common types for the Pet Tracker backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Bearer token (JWT) verification
//! - Cursor-based pagination
//! - Common validation logic

pub mod jwt;
pub mod pagination;
pub mod validation;
