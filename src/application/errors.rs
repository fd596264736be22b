//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Translation error: {0}")]
    Translate(#[from] TranslateError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command registration and execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command already registered: {0}")]
    Duplicate(String),

    #[error("No such command: {0}")]
    Unknown(String),

    /// Handler failure carrying user-facing text
    #[error("{0}")]
    ExecutionFailed(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// The durable backend could not be reached or rejected the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Unavailable(e.to_string())
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(e: tokio::task::JoinError) -> Self {
        StorageError::Unavailable(format!("store task failed: {}", e))
    }
}

/// Localization errors
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Missing translation '{key}' for language '{language}'")]
    MissingTranslation { language: String, key: String },

    #[error("Format mismatch for '{key}': {reason}")]
    FormatMismatch { key: String, reason: String },

    #[error("Invalid resource {file} at line {line}: {reason}")]
    Parse { file: String, line: usize, reason: String },

    #[error("Failed to read language resources: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Legacy settings migration errors
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Invalid legacy record '{record}': {reason}")]
    InvalidLegacyRecord { record: String, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Plugin lifecycle errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin '{0}' already registered")]
    AlreadyRegistered(String),

    #[error("Plugin '{0}' not found")]
    NotFound(String),

    #[error("Plugin '{plugin}' failed to start: {source}")]
    Start {
        plugin: String,
        #[source]
        source: CommandError,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
