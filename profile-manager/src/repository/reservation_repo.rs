use std::sync::Arc;

use shared::{NameReservation, Result, ServiceError};

use crate::repository::USER_NAMES;
use crate::store::{DocumentStore, InsertOutcome};

/// One reservation document exists per name currently held by a live
/// profile. Names are globally unique, independent of device and identity.
#[derive(Clone)]
pub struct ReservationRepository {
    store: Arc<dyn DocumentStore>,
}

impl ReservationRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn reserve(&self, name: &str, uid: &str) -> Result<()> {
        let reservation = NameReservation {
            created_at: self.store.server_timestamp(),
            created_by_uid: uid.to_string(),
        };
        let doc = serde_json::to_value(&reservation)
            .map_err(|e| ServiceError::Internal(format!("Failed to encode reservation: {}", e)))?;

        match self.store.insert_if_absent(USER_NAMES, name, doc).await? {
            InsertOutcome::Created => {
                tracing::debug!(user_name = %name, uid = %uid, "Name reserved");
                Ok(())
            }
            InsertOutcome::AlreadyExists => Err(ServiceError::NameTaken),
        }
    }

    pub async fn release(&self, name: &str) -> Result<()> {
        self.store.delete(USER_NAMES, name).await?;
        tracing::debug!(user_name = %name, "Name reservation released");
        Ok(())
    }

    pub async fn is_reserved(&self, name: &str) -> Result<bool> {
        Ok(self.store.get(USER_NAMES, name).await?.is_some())
    }
}
