//! Chat store: CRUD over named conversations and their message histories.
//!
//! Layout in the key-value store:
//! - `chatList` -- ordered array of `{id, name}` records, creation order;
//! - `currentChatID` -- the active conversation id;
//! - one key per conversation id -- the whole message sequence as a JSON
//!   array, rewritten on every append.
//!
//! Invariant: whenever at least one conversation exists, `currentChatID`
//! names one of them. A stale pointer (or one left behind by an external
//! deletion) is treated as absent, never followed.

use parley_types::chat::{ChatMessage, ChatMeta};
use parley_types::error::StoreError;
use tracing::warn;
use uuid::Uuid;

use super::kv::KvStore;

/// Key holding the ordered conversation list.
pub const CHAT_LIST_KEY: &str = "chatList";

/// Key holding the active conversation id.
pub const CURRENT_CHAT_KEY: &str = "currentChatID";

/// CRUD over named conversations backed by a [`KvStore`].
///
/// All writes are whole-value: the list or a history array is read, mutated,
/// and rewritten. Operations referencing an id that is not listed return
/// [`StoreError::UnknownChat`] without mutating anything.
pub struct ChatStore<K: KvStore> {
    kv: K,
}

impl<K: KvStore> ChatStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Access the underlying key-value store.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Create a fresh conversation, append it to the list, and make it
    /// current. The default name is `"Conversation N"` with N = count + 1.
    pub async fn create_chat(&self) -> Result<ChatMeta, StoreError> {
        let mut list = self.read_list().await?;
        let meta = ChatMeta {
            id: Uuid::new_v4(),
            name: format!("Conversation {}", list.len() + 1),
        };
        list.push(meta.clone());
        self.write_list(&list).await?;
        self.write_current(&meta.id).await?;
        Ok(meta)
    }

    /// All conversations in creation order.
    pub async fn list_chats(&self) -> Result<Vec<ChatMeta>, StoreError> {
        self.read_list().await
    }

    /// Whether `id` names a listed conversation.
    pub async fn chat_exists(&self, id: &Uuid) -> Result<bool, StoreError> {
        Ok(self.read_list().await?.iter().any(|c| c.id == *id))
    }

    /// Rename a conversation in place.
    pub async fn rename_chat(&self, id: &Uuid, name: &str) -> Result<(), StoreError> {
        let mut list = self.read_list().await?;
        let Some(chat) = list.iter_mut().find(|c| c.id == *id) else {
            warn!(chat_id = %id, "rename requested for unknown chat");
            return Err(StoreError::UnknownChat);
        };
        chat.name = name.to_string();
        self.write_list(&list).await
    }

    /// Delete a conversation and its history.
    ///
    /// If the deleted conversation was current, the store itself selects a
    /// replacement: the first remaining conversation, or a newly created
    /// empty one when none remain. Returns the conversation that is current
    /// afterwards.
    pub async fn delete_chat(&self, id: &Uuid) -> Result<ChatMeta, StoreError> {
        let mut list = self.read_list().await?;
        let Some(pos) = list.iter().position(|c| c.id == *id) else {
            warn!(chat_id = %id, "delete requested for unknown chat");
            return Err(StoreError::UnknownChat);
        };
        list.remove(pos);
        self.write_list(&list).await?;
        self.kv.remove(&id.to_string()).await?;

        let was_current = self.read_current_raw().await? == Some(*id);
        if was_current {
            match list.first() {
                Some(first) => {
                    let first = first.clone();
                    self.write_current(&first.id).await?;
                    Ok(first)
                }
                None => self.create_chat().await,
            }
        } else {
            // Current pointer is untouched; resolve it for the caller.
            self.restore_or_create().await
        }
    }

    /// The message sequence for `id`, empty when nothing is persisted.
    ///
    /// No existence check: history left orphaned by an external deletion is
    /// returned as-is rather than crashed on.
    pub async fn history(&self, id: &Uuid) -> Result<Vec<ChatMessage>, StoreError> {
        match self.kv.get(&id.to_string()).await? {
            Some(value) => Ok(serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(chat_id = %id, error = %e, "discarding unreadable chat history");
                Vec::new()
            })),
            None => Ok(Vec::new()),
        }
    }

    /// Append a message and rewrite the whole sequence.
    pub async fn append_message(&self, id: &Uuid, message: ChatMessage) -> Result<(), StoreError> {
        if !self.chat_exists(id).await? {
            warn!(chat_id = %id, "append requested for unknown chat");
            return Err(StoreError::UnknownChat);
        }
        let mut history = self.history(id).await?;
        history.push(message);
        let value = serde_json::to_value(&history)
            .map_err(|e| StoreError::Storage(format!("failed to serialize history: {e}")))?;
        self.kv.set(&id.to_string(), &value).await
    }

    /// Remove the persisted sequence for `id`, leaving the record intact.
    pub async fn clear_history(&self, id: &Uuid) -> Result<(), StoreError> {
        if !self.chat_exists(id).await? {
            warn!(chat_id = %id, "clear requested for unknown chat");
            return Err(StoreError::UnknownChat);
        }
        self.kv.remove(&id.to_string()).await
    }

    /// The active conversation id, validated against the list.
    ///
    /// Returns None when no pointer is persisted or it names a conversation
    /// that no longer exists.
    pub async fn current_chat(&self) -> Result<Option<Uuid>, StoreError> {
        let Some(id) = self.read_current_raw().await? else {
            return Ok(None);
        };
        if self.chat_exists(&id).await? {
            Ok(Some(id))
        } else {
            Ok(None)
        }
    }

    /// Make `id` the active conversation.
    pub async fn select_chat(&self, id: &Uuid) -> Result<(), StoreError> {
        if !self.chat_exists(id).await? {
            warn!(chat_id = %id, "select requested for unknown chat");
            return Err(StoreError::UnknownChat);
        }
        self.write_current(id).await
    }

    /// Startup entry point: resolve the persisted pointer, falling back to a
    /// fresh conversation when it is absent or stale.
    pub async fn restore_or_create(&self) -> Result<ChatMeta, StoreError> {
        if let Some(id) = self.current_chat().await? {
            let list = self.read_list().await?;
            if let Some(meta) = list.into_iter().find(|c| c.id == id) {
                return Ok(meta);
            }
        }
        self.create_chat().await
    }

    // --- Raw list / pointer access ---

    async fn read_list(&self) -> Result<Vec<ChatMeta>, StoreError> {
        match self.kv.get(CHAT_LIST_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unreadable chat list");
                Vec::new()
            })),
            None => Ok(Vec::new()),
        }
    }

    async fn write_list(&self, list: &[ChatMeta]) -> Result<(), StoreError> {
        let value = serde_json::to_value(list)
            .map_err(|e| StoreError::Storage(format!("failed to serialize chat list: {e}")))?;
        self.kv.set(CHAT_LIST_KEY, &value).await
    }

    /// The persisted pointer with no validity check.
    async fn read_current_raw(&self) -> Result<Option<Uuid>, StoreError> {
        match self.kv.get(CURRENT_CHAT_KEY).await? {
            Some(serde_json::Value::String(s)) => Ok(Uuid::parse_str(&s).ok()),
            Some(_) | None => Ok(None),
        }
    }

    async fn write_current(&self, id: &Uuid) -> Result<(), StoreError> {
        self.kv
            .set(CURRENT_CHAT_KEY, &serde_json::Value::String(id.to_string()))
            .await
    }
}
