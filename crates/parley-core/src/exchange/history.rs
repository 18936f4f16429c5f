//! Reconstructing backend conversation history from stored messages.

use parley_types::chat::{ChatMessage, Sender};
use parley_types::protocol::HistoryEntry;

/// Map stored messages to the `{role, content}` pairs the backend accepts.
///
/// User messages become `user` entries; messages from the current assistant
/// identity become `assistant` entries. Everything else -- error
/// placeholders, replies from a previously selected assistant -- is excluded,
/// since the backend only understands the two roles.
pub fn history_for_backend(messages: &[ChatMessage], assistant_name: &str) -> Vec<HistoryEntry> {
    messages
        .iter()
        .filter_map(|message| match &message.sender {
            Sender::User => Some(HistoryEntry::user(message.text.clone())),
            sender if sender.is_assistant(assistant_name) => {
                Some(HistoryEntry::assistant(message.text.clone()))
            }
            _ => None,
        })
        .collect()
}
