//! Per-invocation context handed to command handlers

use std::sync::Arc;
use crate::application::errors::{CommandError, StorageError, TranslateError};
use crate::application::services::{GuildConfigCache, Localizer};
use crate::domain::entities::{CommandRegistry, GuildId, SettingsView};

/// Context bound to the guild a command was invoked in
#[derive(Clone)]
pub struct CommandContext {
    pub guild_id: GuildId,
    /// Command prefix in use, for usage texts
    pub prefix: String,
    /// Settings snapshot taken when the invocation started
    pub settings: SettingsView,
    config: Arc<GuildConfigCache>,
    localizer: Arc<Localizer>,
    registry: Arc<CommandRegistry>,
}

impl CommandContext {
    pub fn new(
        guild_id: impl Into<GuildId>,
        prefix: impl Into<String>,
        settings: SettingsView,
        config: Arc<GuildConfigCache>,
        localizer: Arc<Localizer>,
        registry: Arc<CommandRegistry>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            prefix: prefix.into(),
            settings,
            config,
            localizer,
            registry,
        }
    }

    /// Translate a message into the guild's language
    pub fn translate(&self, key: &str, args: &[&str]) -> Result<String, TranslateError> {
        self.localizer.translate_in(self.settings.language(), key, args)
    }

    /// Like [`CommandContext::translate`], but renders a failure as text
    pub fn t(&self, key: &str, args: &[&str]) -> String {
        self.translate(key, args).unwrap_or_else(|e| {
            tracing::warn!("[{}] {}", self.guild_id, e);
            format!("[{}]", key)
        })
    }

    /// Failure carrying the translated text for `key`
    pub fn fail(&self, key: &str, args: &[&str]) -> CommandError {
        CommandError::ExecutionFailed(self.t(key, args))
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.config.set_setting(&self.guild_id, key, value).await
    }

    pub async fn unset_setting(&self, key: &str) -> Result<(), StorageError> {
        self.config.unset_setting(&self.guild_id, key).await
    }

    pub fn config(&self) -> &GuildConfigCache {
        &self.config
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }
}
