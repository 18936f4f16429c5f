//! CLI command definitions and dispatch for the `parley` binary.
//!
//! Uses clap derive macros. Running with no subcommand starts an
//! interactive chat session; the remaining commands manage conversations
//! from outside one.

pub mod chat;
pub mod chats;
pub mod export;
pub mod provider;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Chat with a remote assistant from your terminal.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session (the default).
    Chat,

    /// List all conversations.
    #[command(alias = "ls")]
    List,

    /// Rename a conversation.
    Rename {
        /// Conversation id or list index.
        chat: String,

        /// The new name.
        name: String,
    },

    /// Delete a conversation and its history.
    #[command(alias = "rm")]
    Delete {
        /// Conversation id or list index.
        chat: String,

        /// Skip confirmation.
        #[arg(long)]
        force: bool,
    },

    /// Clear a conversation's history, keeping the conversation.
    Clear {
        /// Conversation id or list index.
        chat: String,
    },

    /// Show or switch the backend provider.
    Provider {
        /// Provider name (e.g. STACKSPOT, OPENAI); omit to show the current one.
        name: Option<String>,
    },

    /// Export a conversation as a sanitized HTML transcript.
    Export {
        /// Conversation id or list index.
        chat: String,

        /// Output file (defaults to the conversation name).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}
