//! Strictly Hangman - Unified CLI
//!
//! Hangman game server with several modes of operation.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use rmcp::ServiceExt;
use strictly_hangman::{HangmanApi, HangmanConfig, HangmanServer};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays free for the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.db_path)?;

    match cli.command {
        Command::Server => run_mcp_server(&config).await,
        Command::Http { port, host } => {
            let host = host.unwrap_or_else(|| config.http_host().clone());
            let port = port.unwrap_or(*config.http_port());
            run_http_server(&config, host, port).await
        }
        Command::AddWord { words } => add_words(&config, &words),
        Command::AddUser { name, email } => {
            let api = HangmanApi::open(&config)?;
            println!("{}", api.register_user(&name, email)?.message);
            Ok(())
        }
        Command::Rankings => {
            let api = HangmanApi::open(&config)?;
            print_json(&api.rankings()?)
        }
        Command::Leaderboard { limit } => {
            let api = HangmanApi::open(&config)?;
            print_json(&api.leaderboard(limit)?)
        }
        Command::Reminders => {
            let api = HangmanApi::open(&config)?;
            for reminder in api.pending_reminders()? {
                println!(
                    "{} <{}>: {} unfinished game(s)",
                    reminder.name(),
                    reminder.email(),
                    reminder.open_games()
                );
            }
            Ok(())
        }
    }
}

/// Reads the configuration file if given, then applies command-line overrides.
#[instrument(skip(db_path))]
fn load_config(path: Option<&std::path::Path>, db_path: Option<String>) -> Result<HangmanConfig> {
    let config = match path {
        Some(path) => HangmanConfig::from_file(path)?,
        None => HangmanConfig::default(),
    };
    Ok(match db_path {
        Some(db_path) => config.with_db_path(db_path),
        None => config,
    })
}

/// Run the MCP game server (stdio mode)
async fn run_mcp_server(config: &HangmanConfig) -> Result<()> {
    info!("Starting Strictly Hangman MCP server");

    let server = HangmanServer::new(HangmanApi::open(config)?);

    info!("Server ready - connect via MCP protocol");
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;

    Ok(())
}

/// Run the HTTP game server
async fn run_http_server(config: &HangmanConfig, host: String, port: u16) -> Result<()> {
    use axum::Router;
    use rmcp::transport::streamable_http_server::{
        session::local::LocalSessionManager,
        tower::{StreamableHttpServerConfig, StreamableHttpService},
    };
    use std::sync::Arc;

    info!(%host, port, "Starting Strictly Hangman MCP server on HTTP");

    let api = HangmanApi::open(config)?;
    let session_manager = Arc::new(LocalSessionManager::default());

    // Every MCP session gets its own handler over the shared database
    let http_service = StreamableHttpService::new(
        move || Ok(HangmanServer::new(api.clone())),
        session_manager,
        StreamableHttpServerConfig::default(),
    );

    let app = Router::new().fallback_service(tower::service_fn(move |req| {
        let mut service = http_service.clone();
        async move { tower::Service::call(&mut service, req).await }
    }));

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("Server ready at http://{}:{}/", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Adds words to the catalog, reporting duplicates and rejects without stopping.
#[instrument(skip(config, words), fields(count = words.len()))]
fn add_words(config: &HangmanConfig, words: &[String]) -> Result<()> {
    let api = HangmanApi::open(config)?;
    for word in words {
        match api.register_word(word) {
            Ok(confirmation) => println!("{}", confirmation.message),
            Err(e) => {
                warn!(%word, error = %e, "Word not added");
                println!("{}: {}", word, e.kind());
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
