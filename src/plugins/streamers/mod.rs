//! Streamers plugin
//!
//! Keeps a per-guild list of followed streamers, reports whether they are
//! live, and converts the legacy combined setting when the bot joins a guild.

mod commands;
pub mod migration;
pub mod platform;
pub mod status;
pub mod store;

use std::sync::Arc;
use async_trait::async_trait;
use crate::application::errors::PluginError;
use crate::domain::entities::{Command, GuildEventKind};
use crate::plugins::trait_def::{Plugin, PluginContext};

pub use commands::{AddStreamerCommand, RemoveStreamerCommand, StreamersCommand};
pub use migration::{migrate_guild, parse_legacy, GuildJoinMigration, LegacyStreamer, MigrationReport, LEGACY_KEY};
pub use platform::{StreamPlatform, UnknownPlatform};
pub use status::{HttpStatusChecker, StatusChecker, StatusError, StreamStatus};
pub use store::{MemoryStreamerStore, StreamerList, StreamerStore};

pub const PLUGIN_NAME: &str = "streamers";

const GENERAL_CATEGORY: &str = "General Commands";
const ADMIN_CATEGORY: &str = "Streamers Admin Commands";

const COMMANDS: [&str; 3] = ["streamers", "addstreamer", "removestreamer"];

pub struct StreamersPlugin {
    store: Arc<dyn StreamerStore>,
    checker: Arc<dyn StatusChecker>,
}

impl StreamersPlugin {
    pub fn new(store: Arc<dyn StreamerStore>, checker: Arc<dyn StatusChecker>) -> Self {
        Self { store, checker }
    }
}

#[async_trait]
impl Plugin for StreamersPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn description(&self) -> &str {
        "Follow streamers and show who is live"
    }

    async fn start(&self, ctx: &PluginContext) -> Result<(), PluginError> {
        ctx.add_command(
            Command::new(
                "streamers",
                GENERAL_CATEGORY,
                Arc::new(StreamersCommand::new(Arc::clone(&self.store), Arc::clone(&self.checker))),
            )
            .with_description("List the guild's streamers and their status"),
        )?;
        ctx.add_command(
            Command::new(
                "addstreamer",
                ADMIN_CATEGORY,
                Arc::new(AddStreamerCommand::new(Arc::clone(&self.store), Arc::clone(&self.checker))),
            )
            .with_description("Follow a streamer")
            .with_usage("addstreamer <platform> <username>"),
        )?;
        ctx.add_command(
            Command::new(
                "removestreamer",
                ADMIN_CATEGORY,
                Arc::new(RemoveStreamerCommand::new(Arc::clone(&self.store))),
            )
            .with_description("Stop following a streamer")
            .with_usage("removestreamer <platform> <username>"),
        )?;

        ctx.subscribe(
            GuildEventKind::GuildJoined,
            Arc::new(GuildJoinMigration::new(Arc::clone(&ctx.config), Arc::clone(&self.store))),
        );
        Ok(())
    }

    async fn stop(&self, ctx: &PluginContext) {
        for name in COMMANDS {
            ctx.remove_command(name);
        }
        ctx.unsubscribe_all();
    }
}
