use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "skycast")]
#[command(about = "Weather and forecasts from your terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the backend API URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Current conditions for a place
    Current {
        /// Place name (e.g. "Pune" or "Berlin")
        place: String,
    },
    /// Daily forecast for a place
    Forecast {
        /// Place name
        place: String,
        /// Number of days (1-16, server default 7)
        #[arg(long)]
        days: Option<u8>,
    },
    /// Search for locations by name
    Search {
        /// Search query
        query: String,
    },
    /// Create a SkyCast account
    Register,
    /// Log in to SkyCast
    Login,
    /// Log out and clear stored credentials
    Logout,
    /// Show the signed-in profile
    Profile,
    /// Exchange the stored session token for a fresh one
    Refresh,
    /// Manage favorite locations
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommand,
    },
    /// Permanently delete the signed-in account
    DeleteAccount,
}

#[derive(Subcommand)]
pub enum FavoritesCommand {
    /// List saved locations
    List,
    /// Look up a place and add it to the saved list
    Add {
        /// Place name
        place: String,
    },
    /// Remove a saved location by name
    Remove {
        /// Saved location name
        name: String,
    },
}
