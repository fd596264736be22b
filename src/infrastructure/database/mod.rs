//! SQLite persistence for guild settings and plugin data

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::application::errors::StorageError;
use crate::domain::traits::SettingsStore;
use crate::plugins::streamers::{StreamPlatform, StreamerStore};

/// SQLite-backed store.
///
/// rusqlite connections are blocking, so every call runs on the blocking
/// thread pool behind a mutex.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> SqliteResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> SqliteResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SqliteResult<Self> {
        init_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StorageError::Unavailable("database lock poisoned".to_string()))?;
            f(&conn).map_err(StorageError::from)
        })
        .await?
    }

    /// Guilds that currently hold a value for `key`
    pub async fn guilds_with_setting(&self, key: &str) -> Result<Vec<String>, StorageError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT guild_id FROM guild_config WHERE config_name = ?1 ORDER BY guild_id"
            )?;
            let rows = stmt.query_map([key], |row| row.get(0))?;
            rows.collect()
        })
        .await
    }
}

fn init_tables(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS guild_config (
            guild_id TEXT NOT NULL,
            config_name TEXT NOT NULL,
            config_value TEXT NOT NULL,
            PRIMARY KEY (guild_id, config_name)
        )",
        [],
    )?;

    // Streamers plugin: one row per (guild, platform, username)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS guild_streamers (
            guild_id TEXT NOT NULL,
            platform TEXT NOT NULL,
            username TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (guild_id, platform, username)
        )",
        [],
    )?;

    Ok(())
}

#[async_trait]
impl SettingsStore for Database {
    async fn load_all(&self, guild_id: &str) -> Result<HashMap<String, String>, StorageError> {
        let guild_id = guild_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT config_name, config_value FROM guild_config WHERE guild_id = ?1"
            )?;
            let rows = stmt.query_map([guild_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
    }

    async fn upsert(&self, guild_id: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let params = (guild_id.to_string(), key.to_string(), value.to_string());
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO guild_config (guild_id, config_name, config_value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (guild_id, config_name) DO UPDATE SET config_value = excluded.config_value",
                rusqlite::params![params.0, params.1, params.2],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, guild_id: &str, key: &str) -> Result<(), StorageError> {
        let params = (guild_id.to_string(), key.to_string());
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM guild_config WHERE guild_id = ?1 AND config_name = ?2",
                rusqlite::params![params.0, params.1],
            )?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl StreamerStore for Database {
    async fn add(&self, guild_id: &str, platform: StreamPlatform, username: &str) -> Result<bool, StorageError> {
        let params = (guild_id.to_string(), platform.as_str().to_string(), username.to_string());
        self.with_conn(move |conn| {
            let rows = conn.execute(
                "INSERT OR IGNORE INTO guild_streamers (guild_id, platform, username) VALUES (?1, ?2, ?3)",
                rusqlite::params![params.0, params.1, params.2],
            )?;
            Ok(rows > 0)
        })
        .await
    }

    async fn remove(&self, guild_id: &str, platform: StreamPlatform, username: &str) -> Result<bool, StorageError> {
        let params = (guild_id.to_string(), platform.as_str().to_string(), username.to_string());
        self.with_conn(move |conn| {
            let rows = conn.execute(
                "DELETE FROM guild_streamers WHERE guild_id = ?1 AND platform = ?2 AND username = ?3",
                rusqlite::params![params.0, params.1, params.2],
            )?;
            Ok(rows > 0)
        })
        .await
    }

    async fn list(&self, guild_id: &str) -> Result<BTreeMap<StreamPlatform, BTreeSet<String>>, StorageError> {
        let guild_id = guild_id.to_string();
        let rows: Vec<(String, String)> = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT platform, username FROM guild_streamers WHERE guild_id = ?1"
                )?;
                let rows = stmt.query_map([guild_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
                rows.collect()
            })
            .await?;

        let mut streamers: BTreeMap<StreamPlatform, BTreeSet<String>> = BTreeMap::new();
        for (platform, username) in rows {
            match platform.parse::<StreamPlatform>() {
                Ok(platform) => {
                    streamers.entry(platform).or_default().insert(username);
                }
                Err(_) => tracing::warn!("Ignoring streamer {} with unknown platform {}", username, platform),
            }
        }
        Ok(streamers)
    }
}

impl Database {
    /// Value of a single setting, bypassing any cache
    pub async fn setting(&self, guild_id: &str, key: &str) -> Result<Option<String>, StorageError> {
        let params = (guild_id.to_string(), key.to_string());
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT config_value FROM guild_config WHERE guild_id = ?1 AND config_name = ?2",
                rusqlite::params![params.0, params.1],
                |row| row.get(0),
            )
            .optional()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_overwrites_and_delete_is_idempotent() {
        let db = Database::in_memory().unwrap();

        db.upsert("g1", "LANGUAGE", "en").await.unwrap();
        db.upsert("g1", "LANGUAGE", "fr").await.unwrap();
        db.upsert("g1", "LANGUAGE", "fr").await.unwrap();
        db.upsert("g2", "LANGUAGE", "de").await.unwrap();

        let g1 = db.load_all("g1").await.unwrap();
        assert_eq!(g1.len(), 1);
        assert_eq!(g1["LANGUAGE"], "fr");

        db.delete("g1", "LANGUAGE").await.unwrap();
        db.delete("g1", "LANGUAGE").await.unwrap();
        assert!(db.load_all("g1").await.unwrap().is_empty());
        assert_eq!(db.setting("g2", "LANGUAGE").await.unwrap().as_deref(), Some("de"));
    }

    #[tokio::test]
    async fn empty_value_survives_round_trip() {
        let db = Database::in_memory().unwrap();
        db.upsert("g1", "PREFIX", "").await.unwrap();
        assert_eq!(db.setting("g1", "PREFIX").await.unwrap().as_deref(), Some(""));
        assert_eq!(db.setting("g1", "prefix").await.unwrap(), None);
    }

    #[tokio::test]
    async fn streamers_have_set_semantics() {
        let db = Database::in_memory().unwrap();

        assert!(db.add("g1", StreamPlatform::Twitch, "ninja").await.unwrap());
        assert!(!db.add("g1", StreamPlatform::Twitch, "ninja").await.unwrap());
        assert!(db.add("g1", StreamPlatform::Mixer, "ninja").await.unwrap());

        let list = db.list("g1").await.unwrap();
        assert_eq!(list[&StreamPlatform::Twitch].len(), 1);
        assert_eq!(list[&StreamPlatform::Mixer].len(), 1);

        assert!(db.remove("g1", StreamPlatform::Twitch, "ninja").await.unwrap());
        assert!(!db.remove("g1", StreamPlatform::Twitch, "ninja").await.unwrap());
        assert!(!db.list("g1").await.unwrap().contains_key(&StreamPlatform::Twitch));
    }

    #[tokio::test]
    async fn finds_guilds_with_legacy_setting() {
        let db = Database::in_memory().unwrap();
        db.upsert("g2", "streamersPlugin", "ninja,TWITCH").await.unwrap();
        db.upsert("g1", "streamersPlugin", "sam,MIXER").await.unwrap();
        db.upsert("g3", "LANGUAGE", "en").await.unwrap();

        assert_eq!(db.guilds_with_setting("streamersPlugin").await.unwrap(), vec!["g1", "g2"]);
    }
}
