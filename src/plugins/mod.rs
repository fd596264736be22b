//! Plugin system for guild-core
//!
//! Plugins contribute commands and guild event handlers through a scoped
//! [`PluginContext`] and remove them again when stopped.

pub mod builtin;
pub mod manager;
pub mod streamers;
pub mod trait_def;

pub use builtin::CorePlugin;
pub use manager::PluginManager;
pub use streamers::StreamersPlugin;
pub use trait_def::{Plugin, PluginContext, PluginInfo};
