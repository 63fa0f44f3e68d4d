use std::sync::Arc;

use shared::{
    ActiveUser, PersonalId, ProfileConfig, Result, ServiceError, UserName, UserSummary,
};

use crate::repository::{ProfileRepository, ReservationRepository};
use crate::service::guest;
use crate::service::listeners::{ListenerHandle, ListenerRegistry};
use crate::store::{DocumentStore, KeyValueStore};
use crate::ui::{UiEvent, UserInterface};

// Local storage key prefixes. Part of the persisted contract, do not rename.
const LAST_PERSONAL_ID_PREFIX: &str = "lastPersonalId_v1:";
const CURRENT_GROUP_ID_PREFIX: &str = "currentGroupId_v1:";

/// Per-device user profile manager. One logical thread of control: every
/// operation finishes its store round trips before the next begins, and the
/// cached user list is replaced wholesale after each mutation.
pub struct UserManager {
    profiles: ProfileRepository,
    reservations: ReservationRepository,
    kv: Arc<dyn KeyValueStore>,
    ui: Option<Box<dyn UserInterface>>,
    listeners: ListenerRegistry,
    config: ProfileConfig,
    identity: Option<String>,
    users: Vec<UserSummary>,
    current: Option<ActiveUser>,
}

impl UserManager {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        kv: Arc<dyn KeyValueStore>,
        ui: Option<Box<dyn UserInterface>>,
        config: ProfileConfig,
    ) -> Self {
        Self {
            profiles: ProfileRepository::new(store.clone()),
            reservations: ReservationRepository::new(store),
            kv,
            ui,
            listeners: ListenerRegistry::new(),
            config,
            identity: None,
            users: Vec::new(),
            current: None,
        }
    }

    /// Loads the identity's profiles and resolves the active user: the
    /// remembered selection if it still exists, else the first profile by
    /// name, else a freshly bootstrapped guest. Idempotent per identity.
    /// Returns the resolved user name.
    pub async fn init(&mut self, identity: &str) -> Result<String> {
        if identity.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Authenticated identity is required".to_string(),
            ));
        }

        if self.identity.as_deref() == Some(identity) {
            if let Some(current) = &self.current {
                tracing::debug!(identity = %identity, "Already initialized, no-op");
                return Ok(current.user_name.clone());
            }
        }

        self.identity = Some(identity.to_string());
        self.users = self.profiles.list_by_uid(identity).await?;

        let remembered = self.kv.get(&pointer_key(identity));
        let selected = remembered
            .and_then(|pid| {
                self.users
                    .iter()
                    .find(|user| user.personal_id.as_str() == pid)
            })
            .or_else(|| self.users.first())
            .cloned();

        let selected = match selected {
            Some(user) => user,
            None => self.bootstrap_guest_user(identity).await?,
        };

        self.current = Some(ActiveUser {
            personal_id: selected.personal_id.clone(),
            user_name: selected.user_name.clone(),
        });
        self.persist_pointer();
        self.render();
        self.notify();

        shared::record_gauge("profiles.cached", self.users.len() as f64);
        tracing::info!(
            identity = %identity,
            user_name = %selected.user_name,
            profile_count = self.users.len(),
            "User manager initialized"
        );

        Ok(selected.user_name)
    }

    /// Pure read: queries the store and returns the identity's profiles
    /// sorted by name. The cache is not touched.
    pub async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let identity = self.identity.as_deref().ok_or(ServiceError::NotInitialized)?;
        self.profiles.list_by_uid(identity).await
    }

    pub async fn add_user(&mut self, raw_name: &str) -> Result<PersonalId> {
        let identity = self.identity.clone().ok_or(ServiceError::NotInitialized)?;

        // Quota is checked before anything is written.
        if self.users.len() >= self.config.max_users {
            return Err(ServiceError::Validation(format!(
                "ユーザーは{}人までしか作成できません",
                self.config.max_users
            )));
        }

        let name = UserName::new(raw_name)?;
        self.reservations.reserve(name.as_str(), &identity).await?;

        let personal_id = PersonalId::generate();
        self.profiles
            .create(&personal_id, &identity, name.as_str())
            .await?;

        self.users = self.profiles.list_by_uid(&identity).await?;
        self.current = Some(ActiveUser {
            personal_id: personal_id.clone(),
            user_name: name.as_str().to_string(),
        });
        self.persist_pointer();
        self.render();
        self.notify();

        shared::record_counter("profiles.created", 1);
        shared::record_gauge("profiles.cached", self.users.len() as f64);
        tracing::info!(
            identity = %identity,
            personal_id = %personal_id,
            user_name = %name,
            "User profile created"
        );

        Ok(personal_id)
    }

    /// Effect order matters: the new reservation is committed before the old
    /// one is released, so a partial failure can leave an orphaned extra
    /// reservation but never a live name without one.
    pub async fn rename_user(&mut self, personal_id: &PersonalId, raw_name: &str) -> Result<()> {
        let identity = self.identity.clone().ok_or(ServiceError::NotInitialized)?;

        let old = self
            .users
            .iter()
            .find(|user| user.personal_id == *personal_id)
            .cloned()
            .ok_or_else(|| ServiceError::Authorization(personal_id.to_string()))?;

        let new_name = UserName::new(raw_name)?;

        self.reservations
            .reserve(new_name.as_str(), &identity)
            .await?;
        self.reservations.release(&old.user_name).await?;
        self.profiles.rename(personal_id, new_name.as_str()).await?;

        self.clear_aux_keys(&old.user_name, personal_id);

        self.users = self.profiles.list_by_uid(&identity).await?;
        if self
            .current
            .as_ref()
            .is_some_and(|current| current.personal_id == *personal_id)
        {
            self.current = Some(ActiveUser {
                personal_id: personal_id.clone(),
                user_name: new_name.as_str().to_string(),
            });
        }
        self.persist_pointer();
        self.render();
        self.notify();

        shared::record_counter("profiles.renamed", 1);
        tracing::info!(
            identity = %identity,
            personal_id = %personal_id,
            old_name = %old.user_name,
            new_name = %new_name,
            "User profile renamed"
        );

        Ok(())
    }

    pub async fn delete_user(&mut self, personal_id: &PersonalId) -> Result<()> {
        let identity = self.identity.clone().ok_or(ServiceError::NotInitialized)?;

        let Some(target) = self
            .users
            .iter()
            .find(|user| user.personal_id == *personal_id)
            .cloned()
        else {
            tracing::warn!(personal_id = %personal_id, "Delete requested for unknown profile, ignoring");
            return Ok(());
        };

        self.reservations.release(&target.user_name).await?;
        self.profiles.delete(personal_id).await?;
        self.clear_aux_keys(&target.user_name, personal_id);

        self.users = self.profiles.list_by_uid(&identity).await?;

        let was_current = self
            .current
            .as_ref()
            .is_some_and(|current| current.personal_id == *personal_id);
        if was_current {
            match self.users.first().cloned() {
                Some(next) => {
                    self.current = Some(ActiveUser {
                        personal_id: next.personal_id,
                        user_name: next.user_name,
                    });
                    self.persist_pointer();
                }
                None => {
                    self.current = None;
                    self.kv.delete(&pointer_key(&identity));
                }
            }
        }

        self.render();
        self.notify();

        shared::record_counter("profiles.deleted", 1);
        shared::record_gauge("profiles.cached", self.users.len() as f64);
        tracing::info!(
            identity = %identity,
            personal_id = %personal_id,
            user_name = %target.user_name,
            remaining = self.users.len(),
            "User profile deleted"
        );

        Ok(())
    }

    /// Cache-only selection change: no store round trip.
    pub fn select_user(&mut self, personal_id: &PersonalId) -> Result<String> {
        let user = self
            .users
            .iter()
            .find(|user| user.personal_id == *personal_id)
            .cloned()
            .ok_or_else(|| ServiceError::Authorization(personal_id.to_string()))?;

        self.current = Some(ActiveUser {
            personal_id: user.personal_id,
            user_name: user.user_name.clone(),
        });
        self.persist_pointer();
        self.render();
        self.notify();

        tracing::debug!(personal_id = %personal_id, user_name = %user.user_name, "Selection changed");
        Ok(user.user_name)
    }

    /// UI event dispatch. Failures are surfaced through the bound interface;
    /// events that need a prompt are ignored in headless mode.
    pub async fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::SelectionChanged(personal_id) => {
                if let Err(e) = self.select_user(&personal_id) {
                    self.alert(&e);
                }
            }
            UiEvent::AddRequested => {
                let Some(input) = self.prompt("新しいユーザー名を入力してください") else {
                    return;
                };
                if let Err(e) = self.add_user(&input).await {
                    self.alert(&e);
                }
            }
            UiEvent::RenameRequested => {
                let Some(current) = self.current.clone() else {
                    return;
                };
                let Some(input) = self.prompt("新しいユーザー名を入力してください") else {
                    return;
                };
                if let Err(e) = self.rename_user(&current.personal_id, &input).await {
                    self.alert(&e);
                }
            }
            UiEvent::DeleteRequested => {
                let Some(current) = self.current.clone() else {
                    return;
                };
                // UI policy: the last profile cannot be deleted.
                if self.users.len() <= 1 {
                    self.alert_text(
                        "最後のユーザーは削除できません。先に別のユーザーを作成してください",
                    );
                    return;
                }
                let question = format!("{} を削除しますか？", current.user_name);
                if !self.confirm(&question) {
                    return;
                }
                if let Err(e) = self.delete_user(&current.personal_id).await {
                    self.alert(&e);
                }
            }
        }
    }

    pub fn on_user_changed<F>(&mut self, callback: F) -> ListenerHandle
    where
        F: Fn(Option<&ActiveUser>) + Send + Sync + 'static,
    {
        self.listeners.subscribe(Box::new(callback))
    }

    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.unsubscribe(handle)
    }

    pub fn current_user(&self) -> Option<&ActiveUser> {
        self.current.as_ref()
    }

    pub fn cached_users(&self) -> &[UserSummary] {
        &self.users
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    async fn bootstrap_guest_user(&mut self, identity: &str) -> Result<UserSummary> {
        for attempt in 1..=self.config.guest_name_attempts {
            let name = guest::generate_guest_name();
            match self.reservations.reserve(&name, identity).await {
                Ok(()) => {
                    let personal_id = PersonalId::generate();
                    self.profiles.create(&personal_id, identity, &name).await?;
                    self.users = self.profiles.list_by_uid(identity).await?;

                    shared::record_counter("profiles.guest_bootstrap", 1);
                    tracing::info!(
                        identity = %identity,
                        user_name = %name,
                        attempt = attempt,
                        "Guest profile created"
                    );

                    return Ok(UserSummary {
                        personal_id,
                        user_name: name,
                    });
                }
                Err(ServiceError::NameTaken) => {
                    tracing::debug!(attempt = attempt, "Guest name collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(ServiceError::BootstrapExhausted(
            self.config.guest_name_attempts,
        ))
    }

    fn persist_pointer(&self) {
        if let (Some(identity), Some(current)) = (&self.identity, &self.current) {
            self.kv
                .set(&pointer_key(identity), current.personal_id.as_str());
        }
    }

    fn clear_aux_keys(&self, user_name: &str, personal_id: &PersonalId) {
        self.kv
            .delete(&format!("{}{}", CURRENT_GROUP_ID_PREFIX, user_name));
        self.kv
            .delete(&format!("{}{}", CURRENT_GROUP_ID_PREFIX, personal_id.as_str()));
    }

    fn render(&mut self) {
        if let Some(ui) = self.ui.as_mut() {
            ui.render(&self.users, self.current.as_ref());
        }
    }

    fn notify(&self) {
        self.listeners.notify(self.current.as_ref());
    }

    fn prompt(&mut self, message: &str) -> Option<String> {
        match self.ui.as_mut() {
            Some(ui) => ui.prompt(message).filter(|input| !input.trim().is_empty()),
            None => {
                tracing::debug!("Prompt-driven event ignored in headless mode");
                None
            }
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.ui.as_mut().map(|ui| ui.confirm(message)).unwrap_or(false)
    }

    fn alert(&mut self, error: &ServiceError) {
        tracing::warn!(error = %error, "Operation failed");
        let message = error.to_string();
        self.alert_text(&message);
    }

    fn alert_text(&mut self, message: &str) {
        if let Some(ui) = self.ui.as_mut() {
            ui.alert(message);
        }
    }
}

fn pointer_key(identity: &str) -> String {
    format!("{}{}", LAST_PERSONAL_ID_PREFIX, identity)
}
