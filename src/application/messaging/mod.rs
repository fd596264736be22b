//! Command handling - parsing, dispatching and guild events

pub mod context;
pub mod dispatcher;
pub mod events;
pub mod parser;

pub use context::CommandContext;
pub use dispatcher::{Dispatcher, HandlerResult};
pub use events::{EventRegistry, GuildEventHandler};
pub use parser::{CommandParser, Invocation};
