//! Command feature handlers.
//!
//! Each module owns one command feature.

pub mod empty_command;
pub mod list_command;
pub mod trash_command;
