//! Domain error types for the ingestion pipeline.

use thiserror::Error;

/// Reason an ingestion or query call was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDeniedReason {
    /// The owning user's plan tier does not include live location.
    PlanRequired,
    /// The authenticated user does not own the pet.
    NotOwner,
}

impl AccessDeniedReason {
    /// Machine-readable error code surfaced to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessDeniedReason::PlanRequired => "plan_required",
            AccessDeniedReason::NotOwner => "forbidden",
        }
    }
}

impl std::fmt::Display for AccessDeniedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the location ingestion and query pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Access denied: {0}")]
    AccessDenied(AccessDeniedReason),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Out of order: {0}")]
    OutOfOrder(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Error type returned by the storage trait seams.
///
/// The persistence crate maps its driver errors into this; the engine treats
/// every storage failure as a retryable unavailability.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StorageError> for IngestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => IngestError::StorageUnavailable(msg),
        }
    }
}

/// Flattens `validator` errors into a single human-readable message.
pub fn validation_message(errors: &validator::ValidationErrors) -> String {
    let messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |err| {
                format!(
                    "{}: {}",
                    field,
                    err.message.as_ref().unwrap_or(&"invalid value".into())
                )
            })
        })
        .collect();
    messages.join(", ")
}
