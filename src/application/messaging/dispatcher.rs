//! Command dispatcher - Routes invocations to registered handlers

use std::sync::Arc;
use serde::Serialize;
use tracing::Instrument;
use crate::application::errors::CommandError;
use crate::application::services::{GuildConfigCache, Localizer};
use crate::domain::entities::CommandRegistry;
use super::context::CommandContext;
use super::parser::{split_args, CommandParser};

/// Uniform outcome of a command handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerResult {
    pub ok: bool,
    pub message: String,
}

impl HandlerResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Routes command invocations to the handlers in the registry
pub struct Dispatcher {
    parser: CommandParser,
    registry: Arc<CommandRegistry>,
    config: Arc<GuildConfigCache>,
    localizer: Arc<Localizer>,
}

impl Dispatcher {
    pub fn new(
        prefix: impl Into<String>,
        registry: Arc<CommandRegistry>,
        config: Arc<GuildConfigCache>,
        localizer: Arc<Localizer>,
    ) -> Self {
        Self {
            parser: CommandParser::new(prefix),
            registry,
            config,
            localizer,
        }
    }

    pub fn prefix(&self) -> &str {
        self.parser.prefix()
    }

    /// Run command `name` for a guild.
    ///
    /// Fails with [`CommandError::Unknown`] when nothing is registered under
    /// `name`, and with a storage error when the guild's settings cannot be
    /// loaded. A failing handler is reported through the [`HandlerResult`].
    pub async fn dispatch(&self, guild_id: &str, name: &str, raw_args: &str) -> Result<HandlerResult, CommandError> {
        let command = self
            .registry
            .get(name)
            .ok_or_else(|| CommandError::Unknown(name.to_string()))?;

        let settings = self.config.get(guild_id).await?;
        let ctx = CommandContext::new(
            guild_id,
            self.parser.prefix(),
            settings,
            Arc::clone(&self.config),
            Arc::clone(&self.localizer),
            Arc::clone(&self.registry),
        );
        let args = split_args(raw_args);

        let span = tracing::debug_span!(
            "command",
            invocation = %uuid::Uuid::new_v4(),
            guild = %guild_id,
            name = %command.name
        );

        let result = async move {
            tracing::debug!("Dispatching with {} args", args.len());
            match command.handler.handle(&ctx, &args).await {
                Ok(message) => HandlerResult::success(message),
                Err(e) => {
                    tracing::warn!("Command {} failed: {}", command.name, e);
                    HandlerResult::error(e.to_string())
                }
            }
        }
        .instrument(span)
        .await;

        Ok(result)
    }

    /// Parse a chat line and dispatch it; `None` when it is not a command
    pub async fn dispatch_text(&self, guild_id: &str, text: &str) -> Option<Result<HandlerResult, CommandError>> {
        let invocation = self.parser.parse(text)?;
        Some(self.dispatch(guild_id, &invocation.name, &invocation.raw_args).await)
    }

    /// Dispatch a chat line and turn every failure into user-visible text
    pub async fn respond(&self, guild_id: &str, text: &str) -> Option<HandlerResult> {
        let result = self.dispatch_text(guild_id, text).await?;
        Some(match result {
            Ok(result) => result,
            Err(CommandError::Unknown(name)) => {
                let message = self
                    .localizer
                    .translate(guild_id, "command.unknown", &[name.as_str()])
                    .await
                    .unwrap_or_else(|_| format!("No such command: {}", name));
                HandlerResult::error(message)
            }
            Err(e) => {
                tracing::error!("[{}] {}", guild_id, e);
                HandlerResult::error(e.to_string())
            }
        })
    }
}
