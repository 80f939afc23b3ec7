//! rtrash library crate
//!
//! Reconciles trash and untrash intents against a remote file tree. The crate
//! provides both a CLI binary and a library API for programmatic use.

pub mod change;
pub mod change_list;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod errors;
pub mod executor;
pub mod node;
pub mod operations;
pub mod output;
pub mod progress;
pub mod remote;
pub mod theme;
pub mod traversal;
