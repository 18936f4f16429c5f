//! Slash command parsing and help for the chat loop.
//!
//! Commands start with `/` and provide in-chat controls for conversation
//! management and provider switching.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Start a new conversation.
    New,
    /// List conversations.
    List,
    /// Switch to a conversation by list index.
    Switch(usize),
    /// Rename the current conversation.
    Rename(String),
    /// Delete the current conversation.
    Delete,
    /// Clear the current conversation's history.
    Clear,
    /// Switch the backend provider.
    Provider(String),
    /// Persist the display theme (dark / light).
    Theme(String),
    /// Exit the chat session.
    Exit,
    /// Unknown or malformed command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim().to_string());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/new" => Some(ChatCommand::New),
        "/list" | "/chats" => Some(ChatCommand::List),
        "/switch" => match arg.and_then(|a| a.parse::<usize>().ok()) {
            Some(index) if index >= 1 => Some(ChatCommand::Switch(index)),
            _ => Some(ChatCommand::Unknown(
                "/switch requires a list index".to_string(),
            )),
        },
        "/rename" => match arg {
            Some(name) if !name.is_empty() => Some(ChatCommand::Rename(name)),
            _ => Some(ChatCommand::Unknown(
                "/rename requires a new name".to_string(),
            )),
        },
        "/delete" => Some(ChatCommand::Delete),
        "/clear" => Some(ChatCommand::Clear),
        "/provider" => match arg {
            Some(name) if !name.is_empty() => Some(ChatCommand::Provider(name)),
            _ => Some(ChatCommand::Unknown(
                "/provider requires a provider name".to_string(),
            )),
        },
        "/theme" => match arg {
            Some(theme) if theme == "dark" || theme == "light" => Some(ChatCommand::Theme(theme)),
            _ => Some(ChatCommand::Unknown(
                "/theme requires 'dark' or 'light'".to_string(),
            )),
        },
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}      {}", style("/help").cyan(), "Show this help message");
    println!("  {}       {}", style("/new").cyan(), "Start a new conversation");
    println!("  {}      {}", style("/list").cyan(), "List conversations");
    println!("  {}  {}", style("/switch N").cyan(), "Switch to conversation N");
    println!("  {}    {}", style("/rename").cyan(), "Rename this conversation");
    println!("  {}    {}", style("/delete").cyan(), "Delete this conversation");
    println!("  {}     {}", style("/clear").cyan(), "Clear this conversation's history");
    println!("  {}  {}", style("/provider").cyan(), "Switch the backend provider");
    println!("  {}     {}", style("/theme").cyan(), "Set the theme (dark / light)");
    println!("  {}      {}", style("/exit").cyan(), "End the chat session");
    println!();
    println!("  {}", style("Ctrl+D also exits.").dim());
    println!();
}
