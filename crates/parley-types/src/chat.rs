//! Chat session and message types for Parley.
//!
//! These types model what the client persists locally: the ordered list of
//! conversations and the message sequence belonging to each one.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use std::fmt;

/// Reserved sender label for messages typed by the user.
pub const USER_SENDER: &str = "You";

/// Reserved sender label for error placeholders.
pub const ERROR_SENDER: &str = "Error";

/// Who produced a chat message.
///
/// Serialized as the display string: `"You"` for the user, `"Error"` for
/// error placeholders, and the assistant's display name otherwise. Assistant
/// display names must not collide with the two reserved labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant(String),
    Error,
}

impl Sender {
    /// The display string this sender serializes to.
    pub fn as_str(&self) -> &str {
        match self {
            Sender::User => USER_SENDER,
            Sender::Assistant(name) => name,
            Sender::Error => ERROR_SENDER,
        }
    }

    /// Whether this message came from the named assistant identity.
    pub fn is_assistant(&self, assistant_name: &str) -> bool {
        matches!(self, Sender::Assistant(name) if name == assistant_name)
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Sender {
    fn from(s: String) -> Self {
        match s.as_str() {
            USER_SENDER => Sender::User,
            ERROR_SENDER => Sender::Error,
            _ => Sender::Assistant(s),
        }
    }
}

impl Serialize for Sender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Sender::from(String::deserialize(deserializer)?))
    }
}

/// A single message within a conversation.
///
/// Messages are stored as an ordered sequence under the session's id key and
/// are append-only during normal operation. `is_markdown` decides whether the
/// renderer treats the text as Markdown or plain content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub is_markdown: bool,
}

impl ChatMessage {
    /// A message typed by the user (always plain content).
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            is_markdown: false,
        }
    }

    /// A completed assistant reply (rendered as Markdown).
    pub fn assistant(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant(name.into()),
            text: text.into(),
            is_markdown: true,
        }
    }

    /// An error surfaced in place of an assistant reply.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Error,
            text: text.into(),
            is_markdown: false,
        }
    }
}

/// One conversation record in the persisted session list.
///
/// The list lives under a single key in creation order; `id` doubles as the
/// storage key for the conversation's message sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMeta {
    pub id: Uuid,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_roundtrip() {
        for sender in [
            Sender::User,
            Sender::Assistant("GPT-4".to_string()),
            Sender::Error,
        ] {
            let json = serde_json::to_string(&sender).unwrap();
            let parsed: Sender = serde_json::from_str(&json).unwrap();
            assert_eq!(sender, parsed);
        }
    }

    #[test]
    fn test_sender_serializes_to_display_string() {
        let json = serde_json::to_string(&Sender::Assistant("StackSpotAI".to_string())).unwrap();
        assert_eq!(json, "\"StackSpotAI\"");
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"You\"");
        assert_eq!(serde_json::to_string(&Sender::Error).unwrap(), "\"Error\"");
    }

    #[test]
    fn test_sender_is_assistant() {
        let sender = Sender::Assistant("GPT-4".to_string());
        assert!(sender.is_assistant("GPT-4"));
        assert!(!sender.is_assistant("ChatGPT"));
        assert!(!Sender::User.is_assistant("GPT-4"));
        assert!(!Sender::Error.is_assistant("GPT-4"));
    }

    #[test]
    fn test_message_serde_uses_camel_case() {
        let msg = ChatMessage::assistant("GPT-4", "**hi**");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"isMarkdown\":true"));
        assert!(json.contains("\"sender\":\"GPT-4\""));

        let parsed: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_message_constructors() {
        let user = ChatMessage::user("hello");
        assert_eq!(user.sender, Sender::User);
        assert!(!user.is_markdown);

        let assistant = ChatMessage::assistant("GPT-4", "Hi!");
        assert!(assistant.is_markdown);

        let error = ChatMessage::error("boom");
        assert_eq!(error.sender, Sender::Error);
        assert!(!error.is_markdown);
    }

    #[test]
    fn test_chat_meta_serde() {
        let meta = ChatMeta {
            id: Uuid::new_v4(),
            name: "Conversation 1".to_string(),
        };
        let json = serde_json::to_string(&meta).unwrap();
        let parsed: ChatMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meta);
    }
}
