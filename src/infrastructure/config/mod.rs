//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub localization: LocalizationConfig,
    pub plugins: PluginsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// SQLite database file; `None` keeps settings in memory only
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocalizationConfig {
    pub directory: PathBuf,
    pub default_language: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginsConfig {
    pub streamers: StreamersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StreamersConfig {
    pub enabled: bool,
    /// Client-ID sent to the Twitch API
    pub twitch_client_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "guild-core".to_string(),
                prefix: "!".to_string(),
            },
            storage: StorageConfig {
                database: Some(PathBuf::from("guild-core.db")),
            },
            localization: LocalizationConfig {
                directory: PathBuf::from("languages"),
                default_language: "en".to_string(),
            },
            plugins: PluginsConfig {
                streamers: StreamersConfig {
                    enabled: true,
                    twitch_client_id: None,
                },
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue("bot.prefix must not be empty".to_string()));
        }
        if self.localization.default_language.trim().is_empty() {
            return Err(ConfigError::MissingField("localization.default-language".to_string()));
        }
        Ok(())
    }

    /// Apply environment overrides on top of this configuration
    pub fn with_env(mut self) -> Self {
        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Ok(db) = std::env::var("GUILD_CORE_DB") {
            self.storage.database = if db.is_empty() { None } else { Some(PathBuf::from(db)) };
        }

        if let Ok(dir) = std::env::var("GUILD_CORE_LANGUAGES") {
            self.localization.directory = PathBuf::from(dir);
        }

        if let Ok(client_id) = std::env::var("TWITCH_CLIENT_ID") {
            self.plugins.streamers.twitch_client_id = Some(client_id);
        }

        self
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        Config::default().with_env()
    }
}
