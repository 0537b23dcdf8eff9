//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the gamerscore binary.

mod cache;
mod commands;
mod ignore;
mod lookup;

pub use cache::{handle_cache_command, render_cache};
pub use commands::{CacheCommands, Cli, Commands, IgnoreCommands, OutputFormat};
pub use ignore::handle_ignore_command;
pub use lookup::{render_report, run_collect, run_lookup};
