//! Chat controller: the message lifecycle between store, backend, and view.
//!
//! On send: the user's message is persisted immediately and displayed
//! without animation, a pending placeholder appears while the exchange runs,
//! and on any terminal outcome the placeholder is removed -- success starts
//! a typewriter reveal (the full text is persisted once revealed), failure
//! persists and displays an error-sender message. One exchange may be in
//! flight at a time; a second send is rejected, not queued.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;
use uuid::Uuid;

use parley_types::chat::{ChatMessage, ChatMeta, Sender};
use parley_types::error::{ControllerError, ExchangeError};
use parley_types::protocol::SendRequest;

use crate::exchange::client::{BackendTransport, ExchangeClient};
use crate::exchange::history::history_for_backend;
use crate::render::Renderer;
use crate::render::typewriter::{RevealTarget, Typewriter};
use crate::store::chats::ChatStore;
use crate::store::kv::KvStore;

/// Application state the controller carries explicitly instead of reading
/// scattered globals: the selected provider/model, the stable client
/// identity, and the assistant display name they imply.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub provider: String,
    pub model: String,
    pub session_id: String,
    pub assistant_name: String,
}

/// The in-scope slice of the host UI: message lifecycle only.
///
/// `Node` is the host's message element for a typewriter reveal. The
/// pending placeholder is the host's concern to draw; the controller only
/// guarantees the push/remove pairing.
pub trait ConversationView {
    type Node;

    /// Append a completed message with no animation.
    fn push_message(&mut self, sender: &Sender, text: &str, is_markdown: bool);

    /// Show the awaiting-response placeholder.
    fn push_pending(&mut self, assistant_name: &str);

    /// Remove the placeholder (called on every terminal outcome).
    fn remove_pending(&mut self);

    /// Append an empty assistant message node for a reveal to fill.
    fn begin_reveal(&mut self, assistant_name: &str) -> Self::Node;

    /// Remove all displayed messages.
    fn clear(&mut self);
}

/// Wires the chat store, exchange client, and typewriter together.
pub struct ChatController<K: KvStore, T: BackendTransport, R: Renderer> {
    store: ChatStore<K>,
    exchange: ExchangeClient<T>,
    typewriter: Typewriter<R>,
    config: ControllerConfig,
    in_flight: AtomicBool,
}

impl<K: KvStore, T: BackendTransport, R: Renderer> ChatController<K, T, R> {
    pub fn new(
        store: ChatStore<K>,
        exchange: ExchangeClient<T>,
        typewriter: Typewriter<R>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            store,
            exchange,
            typewriter,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &ChatStore<K> {
        &self.store
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Replace the config (after a provider switch).
    pub fn set_config(&mut self, config: ControllerConfig) {
        self.config = config;
    }

    pub fn exchange(&self) -> &ExchangeClient<T> {
        &self.exchange
    }

    /// Resolve the current conversation (creating one if needed) and replay
    /// its history into the view.
    pub async fn open_current<V: ConversationView>(
        &self,
        view: &mut V,
    ) -> Result<ChatMeta, ControllerError> {
        let meta = self.store.restore_or_create().await?;
        self.replay(view, &meta.id).await?;
        Ok(meta)
    }

    /// Start a fresh conversation and clear the view.
    pub async fn new_chat<V: ConversationView>(
        &self,
        view: &mut V,
    ) -> Result<ChatMeta, ControllerError> {
        let meta = self.store.create_chat().await?;
        view.clear();
        Ok(meta)
    }

    /// Make `id` current and replay its history.
    pub async fn switch_chat<V: ConversationView>(
        &self,
        view: &mut V,
        id: &Uuid,
    ) -> Result<(), ControllerError> {
        self.store.select_chat(id).await?;
        self.replay(view, id).await?;
        Ok(())
    }

    /// Delete the current conversation; the store picks the replacement,
    /// whose history is then replayed.
    pub async fn delete_current<V: ConversationView>(
        &self,
        view: &mut V,
    ) -> Result<ChatMeta, ControllerError> {
        let current = self.store.restore_or_create().await?;
        let next = self.store.delete_chat(&current.id).await?;
        self.replay(view, &next.id).await?;
        Ok(next)
    }

    /// Clear the current conversation's history, in store and view.
    pub async fn clear_current<V: ConversationView>(
        &self,
        view: &mut V,
    ) -> Result<(), ControllerError> {
        let current = self.store.restore_or_create().await?;
        self.store.clear_history(&current.id).await?;
        view.clear();
        Ok(())
    }

    /// Send a user message through the full lifecycle.
    pub async fn send<V>(&self, view: &mut V, text: &str) -> Result<(), ControllerError>
    where
        V: ConversationView,
        V::Node: RevealTarget<R::Output>,
    {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(ControllerError::ExchangeInFlight);
        }
        let result = self.send_inner(view, text).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn send_inner<V>(&self, view: &mut V, text: &str) -> Result<(), ControllerError>
    where
        V: ConversationView,
        V::Node: RevealTarget<R::Output>,
    {
        let chat = self.store.restore_or_create().await?;

        // History is reconstructed before the new prompt is appended; the
        // prompt travels in its own field.
        let stored = self.store.history(&chat.id).await?;
        let history = history_for_backend(&stored, &self.config.assistant_name);

        self.store
            .append_message(&chat.id, ChatMessage::user(text))
            .await?;
        view.push_message(&Sender::User, text, false);

        let request = SendRequest {
            provider: self.config.provider.clone(),
            model: self.config.model.clone(),
            prompt: text.to_string(),
            history,
            session_id: self.config.session_id.clone(),
        };

        view.push_pending(&self.config.assistant_name);
        let outcome = self.exchange.run(&request).await;
        view.remove_pending();

        match outcome {
            Ok(response) => {
                let mut node = view.begin_reveal(&self.config.assistant_name);
                self.typewriter.reveal(&mut node, &response, true, || {}).await;
                self.store
                    .append_message(
                        &chat.id,
                        ChatMessage::assistant(&self.config.assistant_name, response),
                    )
                    .await?;
            }
            Err(error) => {
                self.fail(view, &chat.id, &error).await;
            }
        }
        Ok(())
    }

    /// Surface a terminal failure as a persisted error message.
    async fn fail<V: ConversationView>(&self, view: &mut V, chat_id: &Uuid, error: &ExchangeError) {
        let message = ChatMessage::error(error.to_string());
        if let Err(store_error) = self.store.append_message(chat_id, message.clone()).await {
            warn!(chat_id = %chat_id, error = %store_error, "could not persist error message");
        }
        view.push_message(&message.sender, &message.text, message.is_markdown);
    }

    async fn replay<V: ConversationView>(
        &self,
        view: &mut V,
        id: &Uuid,
    ) -> Result<(), ControllerError> {
        view.clear();
        for message in self.store.history(id).await? {
            view.push_message(&message.sender, &message.text, message.is_markdown);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    use parley_types::error::TransportError;
    use parley_types::protocol::{PollReply, SendReply};

    use crate::store::memory::MemoryKvStore;

    // --- Fakes ---

    struct Passthrough;

    impl Renderer for Passthrough {
        type Output = String;

        fn render(&self, text: &str, _as_markdown: bool) -> String {
            text.to_string()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ViewEvent {
        Message(String, String, bool),
        Pending(String),
        RemovePending,
        Reveal(String),
        Content(String),
        Finalized,
        Cleared,
    }

    #[derive(Default)]
    struct RecordingView {
        events: Arc<Mutex<Vec<ViewEvent>>>,
    }

    impl RecordingView {
        fn events(&self) -> Vec<ViewEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    struct RecordingNode {
        events: Arc<Mutex<Vec<ViewEvent>>>,
    }

    impl ConversationView for RecordingView {
        type Node = RecordingNode;

        fn push_message(&mut self, sender: &Sender, text: &str, is_markdown: bool) {
            self.events.lock().unwrap().push(ViewEvent::Message(
                sender.to_string(),
                text.to_string(),
                is_markdown,
            ));
        }

        fn push_pending(&mut self, assistant_name: &str) {
            self.events
                .lock()
                .unwrap()
                .push(ViewEvent::Pending(assistant_name.to_string()));
        }

        fn remove_pending(&mut self) {
            self.events.lock().unwrap().push(ViewEvent::RemovePending);
        }

        fn begin_reveal(&mut self, assistant_name: &str) -> RecordingNode {
            self.events
                .lock()
                .unwrap()
                .push(ViewEvent::Reveal(assistant_name.to_string()));
            RecordingNode {
                events: Arc::clone(&self.events),
            }
        }

        fn clear(&mut self) {
            self.events.lock().unwrap().push(ViewEvent::Cleared);
        }
    }

    impl RevealTarget<String> for RecordingNode {
        fn set_content(&mut self, content: String) {
            self.events.lock().unwrap().push(ViewEvent::Content(content));
        }

        fn near_bottom(&self) -> bool {
            true
        }

        fn scroll_to_bottom(&mut self) {}

        fn finalize(&mut self) {
            self.events.lock().unwrap().push(ViewEvent::Finalized);
        }
    }

    enum Script {
        Polling(Vec<PollReply>),
        SubmitFails(u16, String),
        WaitForGate(Arc<Notify>),
    }

    struct FakeTransport {
        script: Script,
        sent: Mutex<Vec<SendRequest>>,
        cursor: std::sync::atomic::AtomicUsize,
    }

    impl FakeTransport {
        fn new(script: Script) -> Self {
            Self {
                script,
                sent: Mutex::new(Vec::new()),
                cursor: std::sync::atomic::AtomicUsize::new(0),
            }
        }
    }

    impl BackendTransport for FakeTransport {
        async fn send_prompt(&self, request: &SendRequest) -> Result<SendReply, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            match &self.script {
                Script::Polling(_) => Ok(SendReply::Queued {
                    message_id: "abc".to_string(),
                }),
                Script::SubmitFails(status, body) => Err(TransportError::Http {
                    status: *status,
                    body: body.clone(),
                }),
                Script::WaitForGate(gate) => {
                    gate.notified().await;
                    Ok(SendReply::Immediate {
                        response: "gated".to_string(),
                    })
                }
            }
        }

        async fn poll_response(&self, _message_id: &str) -> Result<PollReply, TransportError> {
            match &self.script {
                Script::Polling(replies) => {
                    let index = self.cursor.fetch_add(1, Ordering::SeqCst);
                    Ok(replies
                        .get(index)
                        .cloned()
                        .unwrap_or(PollReply::Processing))
                }
                _ => Ok(PollReply::Processing),
            }
        }

        async fn change_provider(&self, _provider: &str) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn config() -> ControllerConfig {
        ControllerConfig {
            provider: "OPENAI".to_string(),
            model: "gpt-4".to_string(),
            session_id: "sid".to_string(),
            assistant_name: "GPT-4".to_string(),
        }
    }

    fn controller(
        script: Script,
    ) -> ChatController<MemoryKvStore, FakeTransport, Passthrough> {
        ChatController::new(
            ChatStore::new(MemoryKvStore::new()),
            ExchangeClient::new(FakeTransport::new(script)),
            Typewriter::new(Passthrough),
            config(),
        )
    }

    // --- Tests ---

    #[tokio::test(start_paused = true)]
    async fn test_send_end_to_end_through_polling() {
        let controller = controller(Script::Polling(vec![
            PollReply::Processing,
            PollReply::Completed {
                response: "Hi!".to_string(),
            },
        ]));
        let mut view = RecordingView::default();

        let chat = controller.open_current(&mut view).await.unwrap();
        controller.send(&mut view, "hello").await.unwrap();

        // The submit carried an empty history: the prompt is not doubled in.
        let sent = controller.exchange().transport().sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].history.is_empty());
        assert_eq!(sent[0].prompt, "hello");
        assert_eq!(sent[0].session_id, "sid");

        // Persisted history: user then assistant, fields exact.
        let history = controller.store().history(&chat.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], ChatMessage::user("hello"));
        assert_eq!(history[1], ChatMessage::assistant("GPT-4", "Hi!"));

        // View lifecycle: user message, pending, remove, reveal, finalize.
        let events = view.events();
        let pending_at = events
            .iter()
            .position(|e| matches!(e, ViewEvent::Pending(_)))
            .unwrap();
        let removed_at = events
            .iter()
            .position(|e| matches!(e, ViewEvent::RemovePending))
            .unwrap();
        let reveal_at = events
            .iter()
            .position(|e| matches!(e, ViewEvent::Reveal(_)))
            .unwrap();
        assert!(pending_at < removed_at);
        assert!(removed_at < reveal_at);
        assert!(events.contains(&ViewEvent::Finalized));
        assert_eq!(events.last(), Some(&ViewEvent::Finalized));
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_send_carries_prior_history() {
        let controller = controller(Script::Polling(vec![
            PollReply::Completed {
                response: "Hi!".to_string(),
            },
            PollReply::Completed {
                response: "Again!".to_string(),
            },
        ]));
        let mut view = RecordingView::default();

        controller.open_current(&mut view).await.unwrap();
        controller.send(&mut view, "hello").await.unwrap();
        controller.send(&mut view, "and again").await.unwrap();

        let sent = controller.exchange().transport().sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].history.len(), 2);
        assert_eq!(sent[1].history[0].content, "hello");
        assert_eq!(sent[1].history[1].content, "Hi!");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_removes_placeholder_and_persists_error() {
        let controller = controller(Script::SubmitFails(502, "bad gateway".to_string()));
        let mut view = RecordingView::default();

        let chat = controller.open_current(&mut view).await.unwrap();
        controller.send(&mut view, "hello").await.unwrap();

        let history = controller.store().history(&chat.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[1].sender, Sender::Error);
        assert!(history[1].text.contains("502"));

        let events = view.events();
        assert!(events.contains(&ViewEvent::RemovePending));
        assert!(!events.iter().any(|e| matches!(e, ViewEvent::Reveal(_))));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ViewEvent::Message(sender, _, _) if sender == "Error"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_send_rejected_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let controller = Arc::new(controller(Script::WaitForGate(Arc::clone(&gate))));

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move {
                let mut view = RecordingView::default();
                controller.send(&mut view, "first").await
            })
        };
        tokio::task::yield_now().await;

        let mut view = RecordingView::default();
        let second = controller.send(&mut view, "second").await;
        assert!(matches!(second, Err(ControllerError::ExchangeInFlight)));

        gate.notify_one();
        first.await.unwrap().unwrap();

        // The guard resets once the first exchange finishes.
        let mut view = RecordingView::default();
        gate.notify_one();
        controller.send(&mut view, "third").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_chat_replays_history() {
        let controller = controller(Script::Polling(Vec::new()));
        let mut view = RecordingView::default();

        let first = controller.open_current(&mut view).await.unwrap();
        controller
            .store()
            .append_message(&first.id, ChatMessage::user("kept"))
            .await
            .unwrap();

        let second = controller.new_chat(&mut view).await.unwrap();
        assert_ne!(first.id, second.id);

        controller.switch_chat(&mut view, &first.id).await.unwrap();
        let events = view.events();
        assert_eq!(events.last(), Some(&ViewEvent::Message("You".to_string(), "kept".to_string(), false)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_current_replays_replacement() {
        let controller = controller(Script::Polling(Vec::new()));
        let mut view = RecordingView::default();

        let first = controller.open_current(&mut view).await.unwrap();
        let next = controller.delete_current(&mut view).await.unwrap();
        assert_ne!(first.id, next.id);
        assert_eq!(
            controller.store().current_chat().await.unwrap(),
            Some(next.id)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_current_empties_store_and_view() {
        let controller = controller(Script::Polling(Vec::new()));
        let mut view = RecordingView::default();

        let chat = controller.open_current(&mut view).await.unwrap();
        controller
            .store()
            .append_message(&chat.id, ChatMessage::user("gone"))
            .await
            .unwrap();

        controller.clear_current(&mut view).await.unwrap();
        assert!(controller.store().history(&chat.id).await.unwrap().is_empty());
        assert_eq!(view.events().last(), Some(&ViewEvent::Cleared));
    }
}
