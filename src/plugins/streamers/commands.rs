//! `streamers`, `addstreamer` and `removestreamer` commands

use std::sync::Arc;
use async_trait::async_trait;
use crate::application::errors::CommandError;
use crate::application::messaging::CommandContext;
use crate::domain::entities::CommandHandler;
use super::platform::StreamPlatform;
use super::status::StatusChecker;
use super::store::StreamerStore;

/// Lists the guild's streamers with their live status
pub struct StreamersCommand {
    store: Arc<dyn StreamerStore>,
    checker: Arc<dyn StatusChecker>,
}

impl StreamersCommand {
    pub fn new(store: Arc<dyn StreamerStore>, checker: Arc<dyn StatusChecker>) -> Self {
        Self { store, checker }
    }
}

#[async_trait]
impl CommandHandler for StreamersCommand {
    async fn handle(&self, ctx: &CommandContext, _args: &[String]) -> Result<String, CommandError> {
        let streamers = self.store.list(&ctx.guild_id).await.map_err(|e| {
            tracing::warn!("[{}] {}", ctx.guild_id, e);
            ctx.fail("storage.unavailable", &[])
        })?;

        if streamers.values().all(|users| users.is_empty()) {
            return Ok(ctx.t("streamers.none", &[]));
        }

        let mut lines = vec![ctx.t("streamers.header", &[])];
        for (&platform, users) in &streamers {
            let name = platform.as_str();
            for user in users {
                let user = user.as_str();
                let line = match self.checker.check_status(platform, user).await {
                    Ok(status) if status.live => ctx.t(
                        "streamers.live",
                        &[
                            user,
                            name,
                            status.status.as_deref().unwrap_or(""),
                            status.game.as_deref().unwrap_or(""),
                        ],
                    ),
                    Ok(_) => ctx.t("streamers.offline", &[user, name]),
                    Err(e) => {
                        tracing::warn!("Status check for {} on {} failed: {}", user, name, e);
                        ctx.t("streamers.unknown", &[user, name])
                    }
                };
                lines.push(line);
            }
        }
        Ok(lines.join("\n"))
    }
}

fn parse_target<'a>(ctx: &CommandContext, usage_key: &str, args: &'a [String]) -> Result<(StreamPlatform, &'a str), CommandError> {
    let [platform, username] = args else {
        return Err(ctx.fail(usage_key, &[ctx.prefix.as_str()]));
    };
    let platform = StreamPlatform::parse_loose(platform)
        .ok_or_else(|| ctx.fail("streamers.invalid_platform", &[platform.as_str()]))?;
    Ok((platform, username.as_str()))
}

/// Adds a streamer after checking that the account exists
pub struct AddStreamerCommand {
    store: Arc<dyn StreamerStore>,
    checker: Arc<dyn StatusChecker>,
}

impl AddStreamerCommand {
    pub fn new(store: Arc<dyn StreamerStore>, checker: Arc<dyn StatusChecker>) -> Self {
        Self { store, checker }
    }
}

#[async_trait]
impl CommandHandler for AddStreamerCommand {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<String, CommandError> {
        let (platform, username) = parse_target(ctx, "addstreamer.usage", args)?;

        match self.checker.streamer_exists(platform, username).await {
            Ok(true) => {}
            Ok(false) => return Err(ctx.fail("addstreamer.not_found", &[username, platform.as_str()])),
            Err(e) => {
                tracing::warn!("Lookup of {} on {} failed: {}", username, platform, e);
                return Err(ctx.fail("streamers.check_failed", &[platform.as_str()]));
            }
        }

        let added = self.store.add(&ctx.guild_id, platform, username).await.map_err(|e| {
            tracing::warn!("[{}] {}", ctx.guild_id, e);
            ctx.fail("storage.unavailable", &[])
        })?;

        let key = if added { "addstreamer.added" } else { "addstreamer.exists" };
        Ok(ctx.t(key, &[username, platform.as_str()]))
    }
}

/// Removes a streamer from the guild's list
pub struct RemoveStreamerCommand {
    store: Arc<dyn StreamerStore>,
}

impl RemoveStreamerCommand {
    pub fn new(store: Arc<dyn StreamerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for RemoveStreamerCommand {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<String, CommandError> {
        let (platform, username) = parse_target(ctx, "removestreamer.usage", args)?;

        let removed = self.store.remove(&ctx.guild_id, platform, username).await.map_err(|e| {
            tracing::warn!("[{}] {}", ctx.guild_id, e);
            ctx.fail("storage.unavailable", &[])
        })?;

        if removed {
            Ok(ctx.t("removestreamer.removed", &[username, platform.as_str()]))
        } else {
            Err(ctx.fail("removestreamer.not_listed", &[username, platform.as_str()]))
        }
    }
}
