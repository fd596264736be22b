//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: guild settings cache and localization
//! - Errors: Domain-specific errors
//! - Messaging: command parsing, dispatching and guild events

pub mod errors;
pub mod services;
pub mod messaging;
