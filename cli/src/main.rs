pub mod auth;
pub mod cli;
pub mod client;
pub mod commands;
pub mod logger;

use clap::Parser;
use cli::{Cli, Commands, FavoritesCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Current { place } => {
            commands::current(&cli.api_url, place).await?;
        }
        Commands::Forecast { place, days } => {
            commands::forecast(&cli.api_url, place, *days).await?;
        }
        Commands::Search { query } => {
            commands::search(&cli.api_url, query).await?;
        }
        Commands::Register => {
            commands::register(&cli.api_url).await?;
        }
        Commands::Login => {
            commands::login(&cli.api_url).await?;
        }
        Commands::Logout => {
            commands::logout()?;
        }
        Commands::Profile => {
            commands::profile(&cli.api_url).await?;
        }
        Commands::Refresh => {
            commands::refresh(&cli.api_url).await?;
        }
        Commands::Favorites { command } => match command {
            FavoritesCommand::List => commands::favorites_list(&cli.api_url).await?,
            FavoritesCommand::Add { place } => {
                commands::favorites_add(&cli.api_url, place).await?;
            }
            FavoritesCommand::Remove { name } => {
                commands::favorites_remove(&cli.api_url, name).await?;
            }
        },
        Commands::DeleteAccount => {
            commands::delete_account(&cli.api_url).await?;
        }
    }

    Ok(())
}
