use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use crate::application::errors::CommandError;
use crate::application::messaging::CommandContext;

/// Something that can execute a command for a guild
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<String, CommandError>;
}

/// Adapter turning a plain closure into a [`CommandHandler`]
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&CommandContext, &[String]) -> Result<String, CommandError> + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<String, CommandError> {
        (self.0)(ctx, args)
    }
}

/// Represents a bot command
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub usage: Option<String>,
    /// Plugin that registered the command
    pub owner: Option<String>,
    pub handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new(name: impl Into<String>, category: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: normalize(&name.into()),
            category: category.into(),
            description: None,
            usage: None,
            owner: None,
            handler,
        }
    }

    pub fn from_fn<F>(name: impl Into<String>, category: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&CommandContext, &[String]) -> Result<String, CommandError> + Send + Sync + 'static,
    {
        Self::new(name, category, Arc::new(FnHandler(handler)))
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Command registry shared by plugins and the dispatcher.
///
/// Mutations are serialized through one lock; lookups go straight to the
/// sharded map and never wait on it.
#[derive(Default)]
pub struct CommandRegistry {
    commands: DashMap<String, Arc<Command>>,
    mutation: Mutex<()>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, failing if the name is taken
    pub fn register(&self, command: Command) -> Result<(), CommandError> {
        let _guard = self.mutation.lock().unwrap_or_else(PoisonError::into_inner);

        match self.commands.entry(command.name.clone()) {
            Entry::Occupied(_) => Err(CommandError::Duplicate(command.name)),
            Entry::Vacant(slot) => {
                tracing::debug!("Registered command {} ({})", command.name, command.category);
                slot.insert(Arc::new(command));
                Ok(())
            }
        }
    }

    pub fn add_command(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
        category: impl Into<String>,
    ) -> Result<(), CommandError> {
        self.register(Command::new(name, category, handler))
    }

    /// Remove a command. Removing an unknown name is not an error.
    pub fn remove_command(&self, name: &str) -> bool {
        let _guard = self.mutation.lock().unwrap_or_else(PoisonError::into_inner);
        self.commands.remove(&normalize(name)).is_some()
    }

    /// Remove a command only if `owner` registered it
    pub fn remove_owned(&self, name: &str, owner: &str) -> bool {
        let _guard = self.mutation.lock().unwrap_or_else(PoisonError::into_inner);
        self.commands
            .remove_if(&normalize(name), |_, cmd| cmd.owner.as_deref() == Some(owner))
            .is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Command>> {
        self.commands.get(&normalize(name)).map(|c| Arc::clone(c.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&normalize(name))
    }

    /// All commands sorted by name
    pub fn all(&self) -> Vec<Arc<Command>> {
        let mut commands: Vec<_> = self.commands.iter().map(|c| Arc::clone(c.value())).collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    /// Commands grouped by display category
    pub fn by_category(&self) -> BTreeMap<String, Vec<Arc<Command>>> {
        let mut groups: BTreeMap<String, Vec<Arc<Command>>> = BTreeMap::new();
        for cmd in self.all() {
            groups.entry(cmd.category.clone()).or_default().push(cmd);
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
