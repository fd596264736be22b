//! Domain layer - Core business objects and persistence contracts
//! 
//! This layer contains:
//! - Entities: Core business objects (settings snapshots, commands, events)
//! - Traits: Abstractions for infrastructure (SettingsStore)

pub mod entities;
pub mod traits;
