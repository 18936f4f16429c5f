//! Parley terminal chat client entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, initializes the database and application state,
//! then dispatches to the appropriate command handler. With no subcommand,
//! an interactive chat session starts.

mod cli;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,parley=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let state = AppState::init().await?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            cli::chat::loop_runner::run_chat_loop(&state).await?;
        }

        Commands::List => {
            cli::chats::list_chats(&state, cli.json).await?;
        }

        Commands::Rename { chat, name } => {
            cli::chats::rename_chat(&state, &chat, &name, cli.json).await?;
        }

        Commands::Delete { chat, force } => {
            cli::chats::delete_chat(&state, &chat, force, cli.json).await?;
        }

        Commands::Clear { chat } => {
            cli::chats::clear_chat(&state, &chat, cli.json).await?;
        }

        Commands::Provider { name } => {
            cli::provider::provider(&state, name.as_deref(), cli.json).await?;
        }

        Commands::Export { chat, out } => {
            cli::export::export_chat(&state, &chat, out).await?;
        }
    }

    Ok(())
}
