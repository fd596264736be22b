//! Plugin trait definitions

use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::application::errors::PluginError;
use crate::application::messaging::{EventRegistry, GuildEventHandler};
use crate::application::services::{GuildConfigCache, Localizer};
use crate::domain::entities::{Command, CommandRegistry, GuildEventKind};

/// Core plugin trait that all plugins must implement
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique identifier for the plugin
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Register commands and event subscriptions.
    ///
    /// A failed start may leave some registrations behind; the caller unwinds
    /// them by calling [`Plugin::stop`].
    async fn start(&self, ctx: &PluginContext) -> Result<(), PluginError>;

    /// Remove everything `start` registered. Must be safe to call after a
    /// failed or partial start, and more than once.
    async fn stop(&self, ctx: &PluginContext);
}

/// Handle to the shared registries, scoped to one plugin
#[derive(Clone)]
pub struct PluginContext {
    plugin: String,
    pub commands: Arc<CommandRegistry>,
    pub events: Arc<EventRegistry>,
    pub config: Arc<GuildConfigCache>,
    pub localizer: Arc<Localizer>,
}

impl PluginContext {
    pub fn new(
        commands: Arc<CommandRegistry>,
        events: Arc<EventRegistry>,
        config: Arc<GuildConfigCache>,
        localizer: Arc<Localizer>,
    ) -> Self {
        Self {
            plugin: String::new(),
            commands,
            events,
            config,
            localizer,
        }
    }

    /// Same registries, acting on behalf of `plugin`
    pub fn scoped(&self, plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            ..self.clone()
        }
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Register a command owned by this plugin
    pub fn add_command(&self, command: Command) -> Result<(), PluginError> {
        let name = command.name.clone();
        self.commands
            .register(command.with_owner(self.plugin.clone()))
            .map_err(|source| PluginError::Start {
                plugin: self.plugin.clone(),
                source,
            })?;
        tracing::info!("Command {} loaded!", name);
        Ok(())
    }

    /// Remove a command this plugin registered; other owners' commands stay
    pub fn remove_command(&self, name: &str) {
        if self.commands.remove_owned(name, &self.plugin) {
            tracing::info!("Command {} unloaded!", name);
        }
    }

    pub fn subscribe(&self, kind: GuildEventKind, handler: Arc<dyn GuildEventHandler>) {
        self.events.subscribe(self.plugin.clone(), kind, handler);
    }

    pub fn unsubscribe_all(&self) -> usize {
        self.events.unsubscribe(&self.plugin)
    }
}

/// Plugin information for listing
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
    pub running: bool,
}
