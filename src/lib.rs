//! guild-core: per-guild settings, localization and pluggable commands for
//! a multi-guild chat bot.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod plugins;
