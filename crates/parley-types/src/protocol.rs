//! Wire types for the assistant backend protocol.
//!
//! The backend accepts a prompt plus reconstructed conversation history on
//! `POST /send` and answers either synchronously (`response`) or with a
//! correlation token (`message_id`) that is then polled on
//! `GET /get-response` until a terminal status arrives.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an entry in the history sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

impl fmt::Display for HistoryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryRole::User => write!(f, "user"),
            HistoryRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for HistoryRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(HistoryRole::User),
            "assistant" => Ok(HistoryRole::Assistant),
            other => Err(format!("invalid history role: '{other}'")),
        }
    }
}

/// One `{role, content}` pair of reconstructed conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub content: String,
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /send`.
///
/// `session_id` is the stable per-installation client identity, not a chat
/// id; the backend uses it to scope provider state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub provider: String,
    pub model: String,
    pub prompt: String,
    pub history: Vec<HistoryEntry>,
    pub session_id: String,
}

/// Success body of `POST /send`.
///
/// The backend answers in one of two modes: a synchronous `response`, or a
/// `message_id` correlation token to be polled. Untagged because the wire
/// format distinguishes the modes by field name alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SendReply {
    Immediate { response: String },
    Queued { message_id: String },
}

/// Body of `GET /get-response?message_id=<token>`.
///
/// `Processing` is the only non-terminal status; callers keep polling until
/// they see `Completed` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PollReply {
    Processing,
    Completed { response: String },
    Error { message: String },
}

impl PollReply {
    /// Whether this status ends the exchange.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollReply::Processing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_role_roundtrip() {
        for role in [HistoryRole::User, HistoryRole::Assistant] {
            let s = role.to_string();
            let parsed: HistoryRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_send_request_wire_shape() {
        let request = SendRequest {
            provider: "OPENAI".to_string(),
            model: "gpt-4o-mini".to_string(),
            prompt: "hello".to_string(),
            history: vec![HistoryEntry::user("hi"), HistoryEntry::assistant("Hey!")],
            session_id: "abc".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["history"][0]["role"], "user");
        assert_eq!(json["history"][1]["role"], "assistant");
        assert_eq!(json["session_id"], "abc");
    }

    #[test]
    fn test_send_reply_immediate() {
        let reply: SendReply = serde_json::from_str(r#"{"response":"Hi!"}"#).unwrap();
        assert_eq!(
            reply,
            SendReply::Immediate {
                response: "Hi!".to_string()
            }
        );
    }

    #[test]
    fn test_send_reply_queued() {
        let reply: SendReply = serde_json::from_str(r#"{"message_id":"abc"}"#).unwrap();
        assert_eq!(
            reply,
            SendReply::Queued {
                message_id: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_poll_reply_statuses() {
        let processing: PollReply = serde_json::from_str(r#"{"status":"processing"}"#).unwrap();
        assert_eq!(processing, PollReply::Processing);
        assert!(!processing.is_terminal());

        let completed: PollReply =
            serde_json::from_str(r#"{"status":"completed","response":"Hi!"}"#).unwrap();
        assert_eq!(
            completed,
            PollReply::Completed {
                response: "Hi!".to_string()
            }
        );
        assert!(completed.is_terminal());

        let error: PollReply =
            serde_json::from_str(r#"{"status":"error","message":"backend down"}"#).unwrap();
        assert!(error.is_terminal());
    }
}
