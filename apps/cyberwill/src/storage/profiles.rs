use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ChatMessage, GirlProfile, NewProfile, Role};
use crate::storage::KeyValueStore;

pub const PROFILES_KEY: &str = "cyberwill_profiles";
pub const MESSAGES_KEY: &str = "cyberwill_messages";

/// Owned application data: the profile list, every profile's message log and
/// the current selection.
///
/// Loaded once at startup. Persisted mutations rewrite both namespaces in
/// full and only take effect in memory once that write succeeded. The
/// selection is session state and is not persisted.
pub struct ProfileStore {
    kv: Arc<dyn KeyValueStore>,
    profiles: Vec<GirlProfile>,
    messages: BTreeMap<Uuid, Vec<ChatMessage>>,
    current: Option<Uuid>,
}

impl ProfileStore {
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let profiles: Vec<GirlProfile> = match kv.get(PROFILES_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        let mut messages: BTreeMap<Uuid, Vec<ChatMessage>> = match kv.get(MESSAGES_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => BTreeMap::new(),
        };

        // Logs whose profile is gone are unreachable; drop them on load.
        let before = messages.len();
        messages.retain(|id, _| profiles.iter().any(|p| p.id == *id));
        if messages.len() != before {
            warn!(dropped = before - messages.len(), "Dropped orphaned message logs");
        }

        info!(profiles = profiles.len(), "Loaded profile store");
        Ok(Self {
            kv,
            profiles,
            messages,
            current: None,
        })
    }

    /// Writes both namespaces back in full. An empty message map is stored
    /// as an absent key.
    pub fn save(&self) -> Result<(), AppError> {
        self.kv
            .set(PROFILES_KEY, &serde_json::to_string(&self.profiles)?)?;
        if self.messages.is_empty() {
            self.kv.remove(MESSAGES_KEY)
        } else {
            self.kv
                .set(MESSAGES_KEY, &serde_json::to_string(&self.messages)?)
        }
    }

    /// Applies `mutate` and persists the result. If either step fails, memory
    /// is put back as it was; after a failed write the previous state is
    /// written again.
    fn commit<T>(
        &mut self,
        mutate: impl FnOnce(&mut Self) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let snapshot = (self.profiles.clone(), self.messages.clone(), self.current);
        let value = match mutate(self) {
            Ok(value) => value,
            Err(e) => {
                (self.profiles, self.messages, self.current) = snapshot;
                return Err(e);
            }
        };
        if let Err(e) = self.save() {
            (self.profiles, self.messages, self.current) = snapshot;
            // The first key may already hold the new state.
            if let Err(restore) = self.save() {
                warn!(code = restore.code(), "Failed to restore persisted profiles: {restore}");
            }
            return Err(e);
        }
        Ok(value)
    }

    pub fn profiles(&self) -> &[GirlProfile] {
        &self.profiles
    }

    pub fn profile(&self, id: Uuid) -> Option<&GirlProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Creates, persists and selects a new profile.
    pub fn add_profile(&mut self, new: NewProfile) -> Result<GirlProfile, AppError> {
        if new.name.trim().is_empty() {
            return Err(AppError::Validation("profile name must not be empty".to_string()));
        }
        let profile = self.commit(|store| {
            let profile = GirlProfile::create(new);
            store.profiles.push(profile.clone());
            store.current = Some(profile.id);
            Ok(profile)
        })?;
        info!(profile_id = %profile.id, "Profile created");
        Ok(profile)
    }

    /// Removes the profile record together with its whole message log.
    pub fn delete_profile(&mut self, id: Uuid) -> Result<GirlProfile, AppError> {
        let removed = self.commit(|store| {
            let index = store
                .profiles
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;
            store.messages.remove(&id);
            if store.current == Some(id) {
                store.current = None;
            }
            Ok(store.profiles.remove(index))
        })?;
        info!(profile_id = %id, "Profile deleted");
        Ok(removed)
    }

    pub fn select_profile(&mut self, id: Uuid) -> Result<&GirlProfile, AppError> {
        let profile = self
            .profiles
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;
        self.current = Some(id);
        Ok(profile)
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&GirlProfile> {
        self.current.and_then(|id| self.profile(id))
    }

    pub fn messages(&self, profile_id: Uuid) -> &[ChatMessage] {
        self.messages
            .get(&profile_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn push_message(&mut self, profile_id: Uuid, message: ChatMessage) -> Result<(), AppError> {
        self.ensure_profile(profile_id)?;
        self.commit(|store| {
            store.messages.entry(profile_id).or_default().push(message);
            Ok(())
        })
    }

    /// Grows the trailing assistant message of a log.
    ///
    /// Streamed fragments land here many times per second, so this only
    /// touches memory; the caller calls `save` once the stream settles.
    pub fn append_to_last_assistant(&mut self, profile_id: Uuid, delta: &str) -> Result<(), AppError> {
        let last = self
            .messages
            .get_mut(&profile_id)
            .and_then(|log| log.last_mut())
            .filter(|m| m.role == Role::Assistant)
            .ok_or_else(|| {
                AppError::Validation("no assistant message is being streamed".to_string())
            })?;
        last.content.push_str(delta);
        Ok(())
    }

    pub fn clear_messages(&mut self, profile_id: Uuid) -> Result<(), AppError> {
        self.ensure_profile(profile_id)?;
        self.commit(|store| {
            store.messages.remove(&profile_id);
            Ok(())
        })
    }

    fn ensure_profile(&self, profile_id: Uuid) -> Result<(), AppError> {
        if self.profile(profile_id).is_none() {
            return Err(AppError::NotFound(format!("profile {profile_id}")));
        }
        Ok(())
    }
}
