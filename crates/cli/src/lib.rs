//! CLI tool for inspecting consistent hash rings.
//!
//! Provides commands for:
//! - Looking up the owner (and replicas) of keys
//! - Inspecting ring state and per-node ownership
//! - Simulating membership changes and measuring key movement

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
