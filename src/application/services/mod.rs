//! Application services - settings cache and localization

pub mod guild_config;
pub mod localizer;

pub use guild_config::GuildConfigCache;
pub use localizer::{Localizer, DEFAULT_LANGUAGE};
