//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Database: SQLite persistence
//! - Storage: In-memory persistence
//! - I18n: Language resource loading

pub mod config;
pub mod database;
pub mod i18n;
pub mod storage;
