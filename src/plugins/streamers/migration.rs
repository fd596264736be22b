//! Conversion of the legacy combined streamers setting
//!
//! Older deployments kept a guild's streamers in one setting,
//! `user,PLATFORM;user2,PLATFORM2`. On guild join the records move into the
//! streamer store and the setting is removed. Re-running is harmless: the
//! store has set semantics and a guild without the setting is skipped.

use std::sync::Arc;
use async_trait::async_trait;
use crate::application::errors::{BotError, MigrationError};
use crate::application::messaging::GuildEventHandler;
use crate::application::services::GuildConfigCache;
use crate::domain::entities::GuildEvent;
use super::platform::StreamPlatform;
use super::store::StreamerStore;

/// Setting that held the combined streamer list
pub const LEGACY_KEY: &str = "streamersPlugin";

/// A validated legacy record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyStreamer {
    pub username: String,
    pub platform: StreamPlatform,
}

/// Outcome of migrating one guild
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub migrated: usize,
    pub skipped: usize,
}

/// Parse one `user,PLATFORM` record
pub fn parse_record(record: &str) -> Result<LegacyStreamer, MigrationError> {
    let invalid = |reason: &str| MigrationError::InvalidLegacyRecord {
        record: record.to_string(),
        reason: reason.to_string(),
    };

    let fields: Vec<&str> = record.split(',').collect();
    let [username, platform] = fields.as_slice() else {
        return Err(invalid("expected username,PLATFORM"));
    };

    let username = username.trim();
    if username.is_empty() {
        return Err(invalid("empty username"));
    }
    let platform = platform
        .trim()
        .parse::<StreamPlatform>()
        .map_err(|e| invalid(&e.to_string()))?;

    Ok(LegacyStreamer {
        username: username.to_string(),
        platform,
    })
}

/// Split a legacy value into valid records and per-record errors
pub fn parse_legacy(value: &str) -> (Vec<LegacyStreamer>, Vec<MigrationError>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for record in value.split(';').filter(|r| !r.trim().is_empty()) {
        match parse_record(record) {
            Ok(streamer) => valid.push(streamer),
            Err(e) => invalid.push(e),
        }
    }
    (valid, invalid)
}

/// Move a guild's legacy streamer setting into the store.
///
/// Returns `None` when the guild has nothing to migrate. A store failure
/// aborts before the legacy setting is removed, so the next run retries.
pub async fn migrate_guild(
    config: &GuildConfigCache,
    store: &dyn StreamerStore,
    guild_id: &str,
) -> Result<Option<MigrationReport>, MigrationError> {
    let Some(value) = config.get_setting(guild_id, LEGACY_KEY).await? else {
        return Ok(None);
    };

    tracing::info!("Converting guild {} streamers config", guild_id);
    let (valid, invalid) = parse_legacy(&value);
    for e in &invalid {
        tracing::warn!("Guild {}: {}", guild_id, e);
    }

    for streamer in &valid {
        store.add(guild_id, streamer.platform, &streamer.username).await?;
    }

    config.unset_setting(guild_id, LEGACY_KEY).await?;
    tracing::info!("Done converting guild {} streamers config", guild_id);

    Ok(Some(MigrationReport {
        migrated: valid.len(),
        skipped: invalid.len(),
    }))
}

/// Runs the migration whenever the bot joins a guild
pub struct GuildJoinMigration {
    config: Arc<GuildConfigCache>,
    store: Arc<dyn StreamerStore>,
}

impl GuildJoinMigration {
    pub fn new(config: Arc<GuildConfigCache>, store: Arc<dyn StreamerStore>) -> Self {
        Self { config, store }
    }
}

#[async_trait]
impl GuildEventHandler for GuildJoinMigration {
    async fn on_event(&self, event: &GuildEvent) -> Result<(), BotError> {
        match event {
            GuildEvent::Joined { guild_id } => {
                migrate_guild(&self.config, self.store.as_ref(), guild_id).await?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::application::errors::StorageError;
    use crate::infrastructure::storage::MemorySettingsStore;
    use crate::plugins::streamers::store::{MemoryStreamerStore, StreamerList};

    /// Fails the second `add` it sees, then behaves normally
    struct FailSecondAdd {
        inner: MemoryStreamerStore,
        adds: AtomicUsize,
    }

    #[async_trait]
    impl StreamerStore for FailSecondAdd {
        async fn add(&self, guild_id: &str, platform: StreamPlatform, username: &str) -> Result<bool, StorageError> {
            if self.adds.fetch_add(1, Ordering::SeqCst) == 1 {
                return Err(StorageError::Unavailable("connection reset".to_string()));
            }
            self.inner.add(guild_id, platform, username).await
        }

        async fn remove(&self, guild_id: &str, platform: StreamPlatform, username: &str) -> Result<bool, StorageError> {
            self.inner.remove(guild_id, platform, username).await
        }

        async fn list(&self, guild_id: &str) -> Result<StreamerList, StorageError> {
            self.inner.list(guild_id).await
        }
    }

    #[test]
    fn parses_valid_and_invalid_records() {
        let (valid, invalid) = parse_legacy("ninja,TWITCH;badrecord;sam,MIXER");

        assert_eq!(
            valid,
            vec![
                LegacyStreamer { username: "ninja".to_string(), platform: StreamPlatform::Twitch },
                LegacyStreamer { username: "sam".to_string(), platform: StreamPlatform::Mixer },
            ]
        );
        assert_eq!(invalid.len(), 1);
        assert!(matches!(&invalid[0], MigrationError::InvalidLegacyRecord { record, .. } if record == "badrecord"));
    }

    #[test]
    fn rejects_unknown_platform_and_wrong_arity() {
        assert!(parse_record("ninja,YOUTUBE").is_err());
        assert!(parse_record("ninja,twitch").is_err());
        assert!(parse_record("a,TWITCH,extra").is_err());
        assert!(parse_record(",TWITCH").is_err());
    }

    #[test]
    fn ignores_empty_segments() {
        let (valid, invalid) = parse_legacy("ninja,TWITCH;;");
        assert_eq!(valid.len(), 1);
        assert!(invalid.is_empty());
    }

    #[tokio::test]
    async fn interrupted_migration_can_be_rerun() {
        let config = GuildConfigCache::new(Arc::new(MemorySettingsStore::new()));
        config.set_setting("g1", LEGACY_KEY, "ninja,TWITCH;sam,MIXER").await.unwrap();
        let store = FailSecondAdd {
            inner: MemoryStreamerStore::new(),
            adds: AtomicUsize::new(0),
        };

        let first = migrate_guild(&config, &store, "g1").await;
        assert!(matches!(first, Err(MigrationError::Storage(_))));
        assert!(config.get_setting("g1", LEGACY_KEY).await.unwrap().is_some());

        let report = migrate_guild(&config, &store, "g1").await.unwrap();
        assert_eq!(report, Some(MigrationReport { migrated: 2, skipped: 0 }));
        assert_eq!(config.get_setting("g1", LEGACY_KEY).await.unwrap(), None);

        let list = store.list("g1").await.unwrap();
        assert_eq!(list.values().map(|users| users.len()).sum::<usize>(), 2);
        assert!(list[&StreamPlatform::Twitch].contains("ninja"));
        assert!(list[&StreamPlatform::Mixer].contains("sam"));
    }
}
