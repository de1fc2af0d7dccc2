//! Command-line interface for strictly_hangman.

use clap::{Parser, Subcommand};

/// Strictly Hangman - word-guessing game server with MCP interface
#[derive(Parser, Debug)]
#[command(name = "strictly_hangman")]
#[command(about = "Persistent hangman game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Database file (overrides the configuration file)
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the MCP game server (stdio mode)
    Server,

    /// Run the HTTP game server
    Http {
        /// Port to bind to (overrides the configuration file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the configuration file)
        #[arg(long)]
        host: Option<String>,
    },

    /// Add words to the catalog
    AddWord {
        /// Words to add
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Register a player
    AddUser {
        /// Unique player name
        name: String,

        /// Contact address for reminders
        #[arg(long)]
        email: Option<String>,
    },

    /// Print all players ranked by average score
    Rankings,

    /// Print the players with the highest total score
    Leaderboard {
        /// Number of players to show
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Print players who have unfinished games and an email address
    Reminders,
}
