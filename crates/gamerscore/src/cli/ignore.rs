//! Ignore list command handlers.

use super::commands::IgnoreCommands;
use gamerscore_error::GamerscoreResult;
use gamerscore_lookup::GamerscoreConfig;
use gamerscore_storage::IgnoreRegistry;

/// Handle ignore list commands against the configured ignore file.
pub async fn handle_ignore_command(
    config: &GamerscoreConfig,
    cmd: IgnoreCommands,
) -> GamerscoreResult<()> {
    let registry = IgnoreRegistry::open(config.storage().ignore_file()).await?;

    match cmd {
        IgnoreCommands::Add { tag } => {
            if registry.add(&tag).await? {
                println!("Added '{}' to the ignore list", tag.trim());
            } else {
                println!("'{}' is already ignored", tag.trim());
            }
        }
        IgnoreCommands::List => {
            for tag in registry.entries() {
                println!("{}", tag);
            }
            println!("Total: {} gamertags", registry.len());
        }
        IgnoreCommands::Contains { tag } => {
            if registry.contains(&tag) {
                println!("'{}' is ignored", tag.trim());
            } else {
                println!("'{}' is not ignored", tag.trim());
            }
        }
    }

    Ok(())
}
