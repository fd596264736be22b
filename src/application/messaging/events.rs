//! Guild lifecycle event subscriptions
//!
//! Plugins subscribe handlers per event kind. Emitting an event calls every
//! matching handler in subscription order and waits for each one.

use std::sync::{Arc, RwLock, PoisonError};
use async_trait::async_trait;
use crate::application::errors::BotError;
use crate::domain::entities::{GuildEvent, GuildEventKind};

/// Reacts to guild lifecycle events
#[async_trait]
pub trait GuildEventHandler: Send + Sync {
    async fn on_event(&self, event: &GuildEvent) -> Result<(), BotError>;
}

struct Subscription {
    owner: String,
    kind: GuildEventKind,
    handler: Arc<dyn GuildEventHandler>,
}

/// Registry of guild event subscriptions
#[derive(Default)]
pub struct EventRegistry {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `kind` on behalf of `owner`
    pub fn subscribe(&self, owner: impl Into<String>, kind: GuildEventKind, handler: Arc<dyn GuildEventHandler>) {
        let owner = owner.into();
        tracing::debug!("{} subscribed to {}", owner, kind.as_str());
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscription { owner, kind, handler });
    }

    /// Drop every subscription held by `owner`; returns how many were removed
    pub fn unsubscribe(&self, owner: &str) -> usize {
        let mut subscriptions = self.subscriptions.write().unwrap_or_else(PoisonError::into_inner);
        let before = subscriptions.len();
        subscriptions.retain(|s| s.owner != owner);
        before - subscriptions.len()
    }

    pub fn subscriber_count(&self, kind: GuildEventKind) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }

    /// Deliver an event to its subscribers.
    ///
    /// A failing handler is logged and does not keep the others from running.
    /// Returns the number of handlers that completed successfully.
    pub async fn emit(&self, event: &GuildEvent) -> usize {
        let handlers: Vec<(String, Arc<dyn GuildEventHandler>)> = self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.kind == event.kind())
            .map(|s| (s.owner.clone(), Arc::clone(&s.handler)))
            .collect();

        let mut succeeded = 0;
        for (owner, handler) in handlers {
            match handler.on_event(event).await {
                Ok(()) => succeeded += 1,
                Err(e) => tracing::warn!(
                    "{} failed to handle {} for guild {}: {}",
                    owner,
                    event.kind().as_str(),
                    event.guild_id(),
                    e
                ),
            }
        }
        succeeded
    }

    pub async fn emit_guild_joined(&self, guild_id: &str) -> usize {
        self.emit(&GuildEvent::joined(guild_id)).await
    }
}
