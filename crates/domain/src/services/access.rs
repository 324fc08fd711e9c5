//! Plan access gate.
//!
//! Live location is a paid feature: every ingestion or query call resolves
//! the pet's owner and the owner's current plan tier before anything else
//! happens. The gate is stateless and caches nothing, so a plan downgrade
//! takes effect on the very next request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AccessDeniedReason, IngestError, StorageError};
use crate::models::pet::{Pet, PlanTier};

/// Read-only lookup of pets, owned by the external CRUD system.
#[async_trait]
pub trait PetDirectory: Send + Sync {
    async fn find_pet(&self, pet_id: Uuid) -> Result<Option<Pet>, StorageError>;
}

/// Resolves a user's current plan tier; supplied by the external identity
/// and billing system.
#[async_trait]
pub trait PlanResolver: Send + Sync {
    async fn resolve_user_plan(&self, user_id: Uuid) -> Result<Option<PlanTier>, StorageError>;
}

/// Authorizes live-location access for a (user, pet) pair.
pub struct PlanAccessGate {
    pets: Arc<dyn PetDirectory>,
    plans: Arc<dyn PlanResolver>,
}

impl PlanAccessGate {
    pub fn new(pets: Arc<dyn PetDirectory>, plans: Arc<dyn PlanResolver>) -> Self {
        Self { pets, plans }
    }

    /// Checks that the pet exists, belongs to `user_id`, and that the owner's
    /// plan includes live location. Performs no side effects; both lookups
    /// are fresh on every call.
    pub async fn authorize(&self, pet_id: Uuid, user_id: Uuid) -> Result<Pet, IngestError> {
        let pet = self
            .pets
            .find_pet(pet_id)
            .await?
            .ok_or_else(|| IngestError::NotFound(format!("Pet {} not found", pet_id)))?;

        if pet.owner_user_id != user_id {
            debug!(pet_id = %pet_id, user_id = %user_id, "Pet not owned by caller");
            return Err(IngestError::AccessDenied(AccessDeniedReason::NotOwner));
        }

        let plan = self.plans.resolve_user_plan(pet.owner_user_id).await?;

        // A user with no resolvable plan is treated as free tier.
        let plan = plan.unwrap_or(PlanTier::Free);
        if !plan.includes_live_location() {
            debug!(
                pet_id = %pet_id,
                user_id = %user_id,
                plan = plan.as_str(),
                "Live location requires a paid plan"
            );
            return Err(IngestError::AccessDenied(AccessDeniedReason::PlanRequired));
        }

        Ok(pet)
    }
}
