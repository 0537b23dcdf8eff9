//! Gamerscore CLI binary.
//!
//! - Look up gamerscores for one or more gamertags
//! - Collect tags through the permanent ignore list
//! - Inspect and maintain the ignore list and persisted cache

use clap::Parser;
use gamerscore::{
    Cli, Commands, handle_cache_command, handle_ignore_command, init_tracing, run_collect,
    run_lookup,
};
use gamerscore_lookup::GamerscoreConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json_logs).map_err(|e| e.to_string())?;

    let config = match &cli.config {
        Some(path) => GamerscoreConfig::from_file(path)?,
        None => GamerscoreConfig::load()?,
    };

    match cli.command {
        Commands::Lookup { tags } => run_lookup(config, &tags).await?,
        Commands::Collect { tags } => run_collect(config, &tags).await?,
        Commands::Ignore(cmd) => handle_ignore_command(&config, cmd).await?,
        Commands::Cache(cmd) => handle_cache_command(&config, cmd).await?,
    }

    Ok(())
}
