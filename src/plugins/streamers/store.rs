use std::collections::{BTreeMap, BTreeSet, HashMap};
use async_trait::async_trait;
use tokio::sync::RwLock;
use crate::application::errors::StorageError;
use super::platform::StreamPlatform;

/// Streamers followed by a guild, per platform
pub type StreamerList = BTreeMap<StreamPlatform, BTreeSet<String>>;

/// Set-valued streamer storage; adding an existing entry changes nothing
#[async_trait]
pub trait StreamerStore: Send + Sync {
    /// Returns `true` when the entry was not present before
    async fn add(&self, guild_id: &str, platform: StreamPlatform, username: &str) -> Result<bool, StorageError>;

    /// Returns `true` when an entry was removed
    async fn remove(&self, guild_id: &str, platform: StreamPlatform, username: &str) -> Result<bool, StorageError>;

    async fn list(&self, guild_id: &str) -> Result<StreamerList, StorageError>;
}

/// In-memory streamer store
#[derive(Default)]
pub struct MemoryStreamerStore {
    guilds: RwLock<HashMap<String, StreamerList>>,
}

impl MemoryStreamerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StreamerStore for MemoryStreamerStore {
    async fn add(&self, guild_id: &str, platform: StreamPlatform, username: &str) -> Result<bool, StorageError> {
        let mut guilds = self.guilds.write().await;
        Ok(guilds
            .entry(guild_id.to_string())
            .or_default()
            .entry(platform)
            .or_default()
            .insert(username.to_string()))
    }

    async fn remove(&self, guild_id: &str, platform: StreamPlatform, username: &str) -> Result<bool, StorageError> {
        let mut guilds = self.guilds.write().await;
        let Some(list) = guilds.get_mut(guild_id) else {
            return Ok(false);
        };
        let removed = list.get_mut(&platform).map(|users| users.remove(username)).unwrap_or(false);
        list.retain(|_, users| !users.is_empty());
        Ok(removed)
    }

    async fn list(&self, guild_id: &str) -> Result<StreamerList, StorageError> {
        Ok(self.guilds.read().await.get(guild_id).cloned().unwrap_or_default())
    }
}
