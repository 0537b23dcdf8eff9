//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Gamerscore - cached, rate-limited gamerscore lookups for Xbox gamertags
#[derive(Parser, Debug)]
#[command(name = "gamerscore")]
#[command(about = "Cached, rate-limited gamerscore lookups for Xbox gamertags", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file to use instead of the layered defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up gamerscores, bypassing the ignore list
    Lookup {
        /// Gamertags, separated by spaces or commas
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Look up new gamertags once each and flag low scores
    Collect {
        /// Gamertags, separated by spaces or commas
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Ignore list management
    #[command(subcommand)]
    Ignore(IgnoreCommands),

    /// Persisted cache management
    #[command(subcommand)]
    Cache(CacheCommands),
}

/// Ignore list subcommands
#[derive(Subcommand, Debug)]
pub enum IgnoreCommands {
    /// Add a gamertag to the ignore list
    Add {
        /// Gamertag to ignore
        tag: String,
    },

    /// Print every ignored gamertag
    List,

    /// Check whether a gamertag is ignored
    Contains {
        /// Gamertag to check
        tag: String,
    },
}

/// Persisted cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Print cached scores and failure counts
    Show {
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Evict expired scores from the saved cache
    Sweep,

    /// Delete every cached score and failure count
    Clear,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Human,
    /// JSON document
    Json,
}
