//! Command-line front end for the gamerscore lookup service.
//!
//! The binary is a thin shell over [`gamerscore_lookup`]; this library holds
//! the argument definitions, command handlers and tracing setup so they can be
//! tested without spawning a process.

#![warn(missing_docs)]

mod cli;
mod logging;

pub use cli::{
    CacheCommands, Cli, Commands, IgnoreCommands, OutputFormat, handle_cache_command,
    handle_ignore_command, render_cache, render_report, run_collect, run_lookup,
};
pub use logging::{default_filter, init_tracing};
