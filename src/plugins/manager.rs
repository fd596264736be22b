//! Plugin manager - handles plugin lifecycle

use crate::application::errors::PluginError;
use crate::plugins::trait_def::{Plugin, PluginContext, PluginInfo};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn, error};

/// Manages all plugins for the bot
pub struct PluginManager {
    plugins: Vec<Arc<dyn Plugin>>,
    running: HashSet<String>,
    ctx: PluginContext,
}

impl PluginManager {
    /// Create a new plugin manager on top of the shared registries
    pub fn new(ctx: PluginContext) -> Self {
        Self {
            plugins: Vec::new(),
            running: HashSet::new(),
            ctx,
        }
    }

    /// Register a plugin; it is not started yet
    pub fn register<P: Plugin + 'static>(&mut self, plugin: P) -> Result<(), PluginError> {
        self.register_arc(Arc::new(plugin))
    }

    pub fn register_arc(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), PluginError> {
        let name = plugin.name().to_string();

        if self.has_plugin(&name) {
            return Err(PluginError::AlreadyRegistered(name));
        }

        info!("Registering plugin: {}", name);
        self.plugins.push(plugin);
        Ok(())
    }

    fn find(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    /// Start one plugin. On failure its partial registrations are unwound.
    pub async fn start(&mut self, name: &str) -> Result<(), PluginError> {
        let plugin = self.find(name).ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        if self.running.contains(name) {
            return Ok(());
        }

        let ctx = self.ctx.scoped(name);
        match plugin.start(&ctx).await {
            Ok(()) => {
                info!("Started plugin: {}", name);
                self.running.insert(name.to_string());
                Ok(())
            }
            Err(e) => {
                error!("Plugin '{}' failed to start: {}", name, e);
                plugin.stop(&ctx).await;
                Err(e)
            }
        }
    }

    /// Start every registered plugin in registration order.
    ///
    /// Returns the plugins that failed; the others keep running.
    pub async fn start_all(&mut self) -> Vec<(String, PluginError)> {
        let names: Vec<String> = self.plugins.iter().map(|p| p.name().to_string()).collect();
        let mut failures = Vec::new();
        for name in names {
            if let Err(e) = self.start(&name).await {
                failures.push((name, e));
            }
        }
        failures
    }

    /// Stop one plugin; stopping a plugin that is not running is a no-op
    pub async fn stop(&mut self, name: &str) -> Result<(), PluginError> {
        let plugin = self.find(name).ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        if !self.running.remove(name) {
            warn!("Plugin '{}' is not running", name);
            return Ok(());
        }

        plugin.stop(&self.ctx.scoped(name)).await;
        info!("Stopped plugin: {}", name);
        Ok(())
    }

    /// Stop all running plugins in reverse start order
    pub async fn stop_all(&mut self) {
        let names: Vec<String> = self.plugins.iter().rev().map(|p| p.name().to_string()).collect();
        for name in names {
            if self.running.contains(&name) {
                if let Err(e) = self.stop(&name).await {
                    warn!("Failed to stop plugin '{}': {}", name, e);
                }
            }
        }
    }

    /// List all registered plugins
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        self.plugins
            .iter()
            .map(|plugin| PluginInfo {
                name: plugin.name().to_string(),
                description: plugin.description().to_string(),
                running: self.running.contains(plugin.name()),
            })
            .collect()
    }

    /// Check if a plugin exists
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running.contains(name)
    }
}
