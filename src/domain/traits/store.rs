use async_trait::async_trait;
use std::collections::HashMap;
use crate::application::errors::StorageError;

/// Durable per-guild key/value settings.
///
/// `upsert` and `delete` are idempotent, and a failed write leaves the last
/// successful state intact. Every failure to reach the backend is reported as
/// [`StorageError::Unavailable`].
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// All settings of a guild. A guild without rows yields an empty map.
    async fn load_all(&self, guild_id: &str) -> Result<HashMap<String, String>, StorageError>;

    /// Insert or overwrite a single setting.
    async fn upsert(&self, guild_id: &str, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a single setting. Removing an absent key succeeds.
    async fn delete(&self, guild_id: &str, key: &str) -> Result<(), StorageError>;
}
