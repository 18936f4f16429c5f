//! Main chat loop orchestration.
//!
//! Builds the controller from persisted profile state, replays the current
//! conversation, then reads input lines until exit: slash commands are
//! dispatched locally, everything else is sent through the controller's
//! full message lifecycle (persist, pending spinner, poll, reveal).

use console::style;
use rustyline_async::{Readline, ReadlineEvent};
use tracing::warn;

use parley_core::controller::{ChatController, ControllerConfig};
use parley_core::exchange::client::{BackendTransport, ExchangeClient};
use parley_core::render::typewriter::Typewriter;
use parley_infra::http::backend::HttpBackend;
use parley_infra::sqlite::kv::SqliteKvStore;
use parley_types::error::ControllerError;
use parley_types::provider::assistant_display_name;

use crate::state::AppState;

use super::commands::{self, ChatCommand};
use super::pane::TerminalPane;
use super::renderer::{TermRenderer, TermTheme};

type CliController = ChatController<SqliteKvStore, HttpBackend, TermRenderer>;

#[derive(PartialEq)]
enum LoopSignal {
    Continue,
    Quit,
}

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let profile = state.profile();
    let provider = profile.provider().await?;
    let session_id = profile.session_id().await?;
    let theme = TermTheme::from_profile(&profile.theme().await?);
    let assistant_name = assistant_display_name(&provider, &state.model).to_string();

    let renderer = TermRenderer::new(theme);
    let config = ControllerConfig {
        provider,
        model: state.model.clone(),
        session_id,
        assistant_name,
    };
    let mut controller = ChatController::new(
        state.chat_store(),
        ExchangeClient::new(HttpBackend::new(state.backend_url.clone())),
        Typewriter::new(renderer.clone()),
        config,
    );

    let mut pane = TerminalPane::new(renderer);
    let current = controller.open_current(&mut pane).await?;
    print_banner(&current.name, controller.config());

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut input, _writer) = Readline::new(prompt)?;

    loop {
        match input.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                let text = line.trim().to_string();
                if text.is_empty() {
                    continue;
                }

                if let Some(command) = commands::parse(&text) {
                    if handle_command(state, &mut controller, &mut pane, command).await?
                        == LoopSignal::Quit
                    {
                        break;
                    }
                    continue;
                }

                match controller.send(&mut pane, &text).await {
                    Ok(()) => {}
                    Err(ControllerError::ExchangeInFlight) => {
                        println!(
                            "\n  {} Still waiting on the previous reply.",
                            style("!").yellow().bold()
                        );
                    }
                    Err(error) => {
                        warn!(error = %error, "send failed");
                        println!("\n  {} {error}", style("!").red().bold());
                    }
                }
            }
            Ok(ReadlineEvent::Eof) => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            Ok(ReadlineEvent::Interrupted) => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                );
                continue;
            }
            Err(_) => break,
        }
    }

    Ok(())
}

fn print_banner(chat_name: &str, config: &ControllerConfig) {
    println!();
    println!(
        "  {} {}",
        style("Parley").cyan().bold(),
        style(chat_name).bold()
    );
    println!(
        "  {}",
        style(format!(
            "provider {} / model {} / talking to {}",
            config.provider, config.model, config.assistant_name
        ))
        .dim()
    );
    println!("  {}", style("Type /help for commands.").dim());
    println!();
}

async fn handle_command(
    state: &AppState,
    controller: &mut CliController,
    pane: &mut TerminalPane,
    command: ChatCommand,
) -> anyhow::Result<LoopSignal> {
    match command {
        ChatCommand::Help => commands::print_help(),

        ChatCommand::New => {
            let chat = controller.new_chat(pane).await?;
            println!(
                "\n  {} Started '{}'\n",
                style("+").cyan().bold(),
                style(&chat.name).bold()
            );
        }

        ChatCommand::List => {
            let list = controller.store().list_chats().await?;
            let current = controller.store().current_chat().await?;
            println!();
            for (index, chat) in list.iter().enumerate() {
                let marker = if current == Some(chat.id) {
                    style("*").cyan().bold().to_string()
                } else {
                    " ".to_string()
                };
                println!("  {marker} {}. {}", index + 1, chat.name);
            }
            println!();
        }

        ChatCommand::Switch(index) => {
            let list = controller.store().list_chats().await?;
            match list.get(index - 1) {
                Some(chat) => {
                    let (id, name) = (chat.id, chat.name.clone());
                    controller.switch_chat(pane, &id).await?;
                    println!(
                        "\n  {} Switched to '{}'\n",
                        style("*").cyan().bold(),
                        style(name).bold()
                    );
                }
                None => {
                    println!(
                        "\n  {} No conversation at index {index}.\n",
                        style("?").yellow().bold()
                    );
                }
            }
        }

        ChatCommand::Rename(name) => {
            let current = controller.store().restore_or_create().await?;
            controller.store().rename_chat(&current.id, &name).await?;
            println!(
                "\n  {} Renamed to '{}'\n",
                style("✓").green(),
                style(&name).bold()
            );
        }

        ChatCommand::Delete => {
            let next = controller.delete_current(pane).await?;
            println!(
                "\n  {} Deleted; '{}' is now current\n",
                style("✓").green(),
                style(&next.name).bold()
            );
        }

        ChatCommand::Clear => {
            controller.clear_current(pane).await?;
            println!("\n  {} History cleared\n", style("✓").green());
        }

        ChatCommand::Provider(name) => {
            match controller.exchange().transport().change_provider(&name).await {
                Ok(()) => {
                    state.profile().set_provider(&name).await?;
                    let assistant_name = assistant_display_name(&name, &state.model).to_string();
                    let mut config = controller.config().clone();
                    config.provider = name.clone();
                    config.assistant_name = assistant_name.clone();
                    controller.set_config(config);
                    println!(
                        "\n  {} Switched to {} -- you are now talking to {}\n",
                        style("✓").green(),
                        style(&name).bold(),
                        style(&assistant_name).cyan()
                    );
                }
                Err(error) => {
                    println!(
                        "\n  {} Could not switch provider: {error}\n",
                        style("!").red().bold()
                    );
                }
            }
        }

        ChatCommand::Theme(theme) => {
            state.profile().set_theme(&theme).await?;
            println!(
                "\n  {} Theme saved; applies on next start.\n",
                style("✓").green()
            );
        }

        ChatCommand::Exit => {
            println!("\n  {}", style("Session ended.").dim());
            return Ok(LoopSignal::Quit);
        }

        ChatCommand::Unknown(detail) => {
            println!(
                "\n  {} {}. Type /help for available commands.\n",
                style("?").yellow().bold(),
                style(detail).dim()
            );
        }
    }

    Ok(LoopSignal::Continue)
}
