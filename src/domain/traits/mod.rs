//! Domain traits - Abstractions for infrastructure implementations

pub mod store;

pub use store::SettingsStore;
