//! Domain entities - Core business objects

pub mod bundle;
pub mod command;
pub mod event;
pub mod settings;

pub use bundle::{format_template, LanguageBundle};
pub use command::{Command, CommandHandler, CommandRegistry, FnHandler};
pub use event::{GuildEvent, GuildEventKind};
pub use settings::{GuildId, SettingsView, LANGUAGE_KEY};
