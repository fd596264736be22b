use std::collections::HashMap;
use std::sync::Arc;
use dashmap::DashMap;
use tokio::sync::RwLock;
use crate::application::errors::StorageError;
use crate::domain::entities::{GuildId, SettingsView};
use crate::domain::traits::SettingsStore;

type Values = Arc<HashMap<String, String>>;

/// `None` until the guild's settings have been loaded from the store
type Slot = Arc<RwLock<Option<Values>>>;

/// Write-through cache of per-guild settings.
///
/// Each guild gets its own lock. Writes hold it for the whole store
/// round-trip, so a reader never observes a value the store rejected and two
/// writers on the same guild never interleave. Guilds never contend with each
/// other.
pub struct GuildConfigCache {
    store: Arc<dyn SettingsStore>,
    guilds: DashMap<GuildId, Slot>,
}

impl GuildConfigCache {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            guilds: DashMap::new(),
        }
    }

    fn slot(&self, guild_id: &str) -> Slot {
        if let Some(slot) = self.guilds.get(guild_id) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.guilds.entry(guild_id.to_string()).or_default().value())
    }

    async fn load_into(&self, guild_id: &str, entry: &mut Option<Values>) -> Result<(), StorageError> {
        if entry.is_some() {
            return Ok(());
        }

        let values = self.store.load_all(guild_id).await.map_err(|e| {
            tracing::warn!("Failed to load settings for guild {}: {}", guild_id, e);
            e
        })?;
        tracing::debug!("Loaded {} settings for guild {}", values.len(), guild_id);
        *entry = Some(Arc::new(values));
        Ok(())
    }

    /// Settings snapshot for a guild, loading it on first use
    pub async fn get(&self, guild_id: &str) -> Result<SettingsView, StorageError> {
        let slot = self.slot(guild_id);

        if let Some(values) = slot.read().await.as_ref() {
            return Ok(SettingsView::new(Arc::clone(values)));
        }

        let mut entry = slot.write().await;
        self.load_into(guild_id, &mut entry).await?;
        Ok(entry.clone().map(SettingsView::new).unwrap_or_default())
    }

    pub async fn get_setting(&self, guild_id: &str, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(guild_id).await?.get(key).map(str::to_string))
    }

    /// Persist a setting, then update the cached copy.
    ///
    /// On store failure the cached copy is left untouched and the error is
    /// returned to the caller.
    pub async fn set_setting(&self, guild_id: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let slot = self.slot(guild_id);
        let mut entry = slot.write().await;

        self.store.upsert(guild_id, key, value).await.map_err(|e| {
            tracing::warn!("Failed to save setting {} for guild {}: {}", key, guild_id, e);
            e
        })?;

        // An unloaded guild picks the new value up from the store on first read.
        if let Some(values) = entry.as_mut() {
            Arc::make_mut(values).insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    /// Delete a setting from the store, then from the cached copy
    pub async fn unset_setting(&self, guild_id: &str, key: &str) -> Result<(), StorageError> {
        let slot = self.slot(guild_id);
        let mut entry = slot.write().await;

        self.store.delete(guild_id, key).await.map_err(|e| {
            tracing::warn!("Failed to delete setting {} for guild {}: {}", key, guild_id, e);
            e
        })?;

        if let Some(values) = entry.as_mut() {
            Arc::make_mut(values).remove(key);
        }
        Ok(())
    }

    /// Forget the cached copy so the next access reloads it from the store
    pub async fn invalidate(&self, guild_id: &str) {
        let slot = self.guilds.get(guild_id).map(|s| Arc::clone(s.value()));
        if let Some(slot) = slot {
            *slot.write().await = None;
            tracing::debug!("Invalidated settings cache for guild {}", guild_id);
        }
    }

    /// Guilds whose settings are currently held in memory
    pub async fn loaded_guilds(&self) -> Vec<GuildId> {
        let slots: Vec<(GuildId, Slot)> = self
            .guilds
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();

        let mut loaded = Vec::new();
        for (guild_id, slot) in slots {
            if slot.read().await.is_some() {
                loaded.push(guild_id);
            }
        }
        loaded.sort();
        loaded
    }
}
