//! In-memory storage implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::domain::traits::SettingsStore;
use crate::application::errors::StorageError;

/// Settings store kept in process memory.
///
/// Used in development mode and tests. It can be switched offline to
/// exercise the failure paths of its callers.
pub struct MemorySettingsStore {
    settings: RwLock<HashMap<String, HashMap<String, String>>>,
    loads: RwLock<HashMap<String, usize>>,
    available: AtomicBool,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(HashMap::new()),
            loads: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the backend going away (`false`) or coming back (`true`)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// How often `load_all` was called for a guild
    pub async fn load_count(&self, guild_id: &str) -> usize {
        self.loads.read().await.get(guild_id).copied().unwrap_or(0)
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory store is offline".to_string()))
        }
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load_all(&self, guild_id: &str) -> Result<HashMap<String, String>, StorageError> {
        self.check()?;
        *self.loads.write().await.entry(guild_id.to_string()).or_insert(0) += 1;
        let settings = self.settings.read().await;
        Ok(settings.get(guild_id).cloned().unwrap_or_default())
    }

    async fn upsert(&self, guild_id: &str, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        let mut settings = self.settings.write().await;
        settings
            .entry(guild_id.to_string())
            .or_insert_with(HashMap::new)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, guild_id: &str, key: &str) -> Result<(), StorageError> {
        self.check()?;
        let mut settings = self.settings.write().await;
        if let Some(guild) = settings.get_mut(guild_id) {
            guild.remove(key);
            if guild.is_empty() {
                settings.remove(guild_id);
            }
        }
        Ok(())
    }
}
