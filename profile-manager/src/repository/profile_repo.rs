use std::sync::Arc;

use serde_json::{json, Value};
use shared::{PersonalId, Result, ServiceError, UserProfile, UserSummary};

use crate::repository::USER_PROFILES;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct ProfileRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProfileRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, personal_id: &PersonalId, uid: &str, name: &str) -> Result<()> {
        let profile = UserProfile {
            personal_id: personal_id.clone(),
            uid: uid.to_string(),
            user_name: name.to_string(),
            created_at: self.store.server_timestamp(),
        };
        let doc = serde_json::to_value(&profile)
            .map_err(|e| ServiceError::Internal(format!("Failed to encode profile: {}", e)))?;

        self.store
            .set(USER_PROFILES, personal_id.as_str(), doc, false)
            .await
    }

    /// Merge-update of the name field only; the rest of the document is left
    /// untouched.
    pub async fn rename(&self, personal_id: &PersonalId, name: &str) -> Result<()> {
        self.store
            .set(
                USER_PROFILES,
                personal_id.as_str(),
                json!({ "userName": name }),
                true,
            )
            .await
    }

    pub async fn delete(&self, personal_id: &PersonalId) -> Result<()> {
        self.store.delete(USER_PROFILES, personal_id.as_str()).await
    }

    pub async fn get(&self, personal_id: &PersonalId) -> Result<Option<UserProfile>> {
        match self.store.get(USER_PROFILES, personal_id.as_str()).await? {
            Some(doc) => {
                let profile = serde_json::from_value(doc)
                    .map_err(|e| ServiceError::Store(format!("Malformed profile: {}", e)))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// All profiles owned by `uid`, projected to id + name and sorted
    /// lexicographically by name. Records missing a name are dropped; a
    /// missing id field falls back to the document key.
    pub async fn list_by_uid(&self, uid: &str) -> Result<Vec<UserSummary>> {
        let documents = self.store.query_by_field(USER_PROFILES, "uid", uid).await?;

        let mut users: Vec<UserSummary> = documents
            .into_iter()
            .filter_map(|(key, doc)| summarize(&key, &doc))
            .collect();

        users.sort_by(|a, b| {
            (a.user_name.as_str(), a.personal_id.as_str())
                .cmp(&(b.user_name.as_str(), b.personal_id.as_str()))
        });

        Ok(users)
    }
}

fn summarize(key: &str, doc: &Value) -> Option<UserSummary> {
    let personal_id = doc
        .get("personalId")
        .and_then(Value::as_str)
        .unwrap_or(key);
    let user_name = doc.get("userName").and_then(Value::as_str)?;

    let personal_id = PersonalId::new(personal_id).ok()?;
    Some(UserSummary {
        personal_id,
        user_name: user_name.to_string(),
    })
}
