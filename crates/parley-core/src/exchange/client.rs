//! Exchange client: submit a prompt, poll for the response.
//!
//! One exchange moves through `Submitted -> Processing -> {Completed |
//! Failed}`. Submission either short-circuits to Completed (a backend in
//! synchronous mode answers inline) or yields a correlation token that is
//! polled on a fixed interval until a terminal status arrives. Polling is
//! deliberately unbounded: the backend's generation latency has no upper
//! bound and the protocol defines no retry cap, so only the interval is
//! configurable.

use std::time::Duration;

use tracing::debug;

use parley_types::error::{ExchangeError, TransportError};
use parley_types::protocol::{PollReply, SendReply, SendRequest};

/// Interval between `/get-response` polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Trait for the backend the client exchanges prompts with.
///
/// The HTTP implementation lives in parley-infra; tests script replies
/// directly. A transport failure on either call is terminal for the
/// exchange -- there is nothing left to poll.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait BackendTransport: Send + Sync {
    /// `POST /send`: submit a prompt plus reconstructed history.
    fn send_prompt(
        &self,
        request: &SendRequest,
    ) -> impl std::future::Future<Output = Result<SendReply, TransportError>> + Send;

    /// `GET /get-response`: poll one correlation token.
    fn poll_response(
        &self,
        message_id: &str,
    ) -> impl std::future::Future<Output = Result<PollReply, TransportError>> + Send;

    /// `POST /change-provider`: switch the backend's active provider.
    fn change_provider(
        &self,
        provider: &str,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}

/// States of one in-flight exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Submitted,
    Processing,
    Completed,
    Failed,
}

/// Drives one prompt through the submit/poll protocol.
pub struct ExchangeClient<T: BackendTransport> {
    transport: T,
    poll_interval: Duration,
}

impl<T: BackendTransport> ExchangeClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the poll interval (tests inject a short one under paused
    /// time).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Access the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one exchange to a terminal state, returning the response text.
    pub async fn run(&self, request: &SendRequest) -> Result<String, ExchangeError> {
        debug!(state = ?ExchangeState::Submitted, provider = %request.provider, "submitting prompt");
        let reply = self.transport.send_prompt(request).await?;

        let message_id = match reply {
            SendReply::Immediate { response } => {
                debug!(state = ?ExchangeState::Completed, "backend answered synchronously");
                return Ok(response);
            }
            SendReply::Queued { message_id } => message_id,
        };

        debug!(state = ?ExchangeState::Processing, message_id = %message_id, "polling for response");
        loop {
            tokio::time::sleep(self.poll_interval).await;
            match self.transport.poll_response(&message_id).await? {
                PollReply::Processing => continue,
                PollReply::Completed { response } => {
                    debug!(state = ?ExchangeState::Completed, message_id = %message_id, "response ready");
                    return Ok(response);
                }
                PollReply::Error { message } => {
                    debug!(state = ?ExchangeState::Failed, message_id = %message_id, "backend reported failure");
                    return Err(ExchangeError::Backend(message));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Transport that replays a scripted sequence of poll replies.
    struct ScriptedTransport {
        send_reply: Result<SendReply, TransportError>,
        polls: Mutex<Vec<Result<PollReply, TransportError>>>,
        poll_count: AtomicUsize,
        sent: Mutex<Vec<SendRequest>>,
    }

    impl ScriptedTransport {
        fn new(
            send_reply: Result<SendReply, TransportError>,
            polls: Vec<Result<PollReply, TransportError>>,
        ) -> Self {
            Self {
                send_reply,
                polls: Mutex::new(polls),
                poll_count: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl BackendTransport for ScriptedTransport {
        async fn send_prompt(&self, request: &SendRequest) -> Result<SendReply, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            match &self.send_reply {
                Ok(reply) => Ok(reply.clone()),
                Err(TransportError::Http { status, body }) => Err(TransportError::Http {
                    status: *status,
                    body: body.clone(),
                }),
                Err(TransportError::Network(e)) => Err(TransportError::Network(e.clone())),
                Err(TransportError::Decode(e)) => Err(TransportError::Decode(e.clone())),
            }
        }

        async fn poll_response(&self, _message_id: &str) -> Result<PollReply, TransportError> {
            self.poll_count.fetch_add(1, Ordering::SeqCst);
            let mut polls = self.polls.lock().unwrap();
            if polls.is_empty() {
                Ok(PollReply::Processing)
            } else {
                polls.remove(0)
            }
        }

        async fn change_provider(&self, _provider: &str) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn request() -> SendRequest {
        SendRequest {
            provider: "OPENAI".to_string(),
            model: "gpt-4o-mini".to_string(),
            prompt: "hello".to_string(),
            history: Vec::new(),
            session_id: "sid".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_synchronous_reply_skips_polling() {
        let transport = ScriptedTransport::new(
            Ok(SendReply::Immediate {
                response: "Hi!".to_string(),
            }),
            Vec::new(),
        );
        let client = ExchangeClient::new(transport);

        let response = client.run(&request()).await.unwrap();
        assert_eq!(response, "Hi!");
        assert_eq!(client.transport().poll_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_completed() {
        let transport = ScriptedTransport::new(
            Ok(SendReply::Queued {
                message_id: "abc".to_string(),
            }),
            vec![
                Ok(PollReply::Processing),
                Ok(PollReply::Completed {
                    response: "Hi!".to_string(),
                }),
            ],
        );
        let client = ExchangeClient::new(transport);

        let started = Instant::now();
        let response = client.run(&request()).await.unwrap();
        assert_eq!(response, "Hi!");
        assert_eq!(client.transport().poll_count.load(Ordering::SeqCst), 2);
        // One interval before each poll.
        assert_eq!(started.elapsed(), DEFAULT_POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_error_is_terminal() {
        let transport = ScriptedTransport::new(
            Ok(SendReply::Queued {
                message_id: "abc".to_string(),
            }),
            vec![
                Ok(PollReply::Processing),
                Ok(PollReply::Error {
                    message: "model unavailable".to_string(),
                }),
            ],
        );
        let client = ExchangeClient::new(transport);

        let err = client.run(&request()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Backend(ref m) if m == "model unavailable"));
        // Terminal: no further polls happen after the error reply.
        assert_eq!(client.transport().poll_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_transport_failure_is_terminal() {
        let transport = ScriptedTransport::new(
            Err(TransportError::Http {
                status: 502,
                body: "bad gateway".to_string(),
            }),
            Vec::new(),
        );
        let client = ExchangeClient::new(transport);

        let err = client.run(&request()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Transport(_)));
        assert_eq!(client.transport().poll_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_transport_failure_stops_polling() {
        let transport = ScriptedTransport::new(
            Ok(SendReply::Queued {
                message_id: "abc".to_string(),
            }),
            vec![Err(TransportError::Network("connection reset".to_string()))],
        );
        let client = ExchangeClient::new(transport);

        let err = client.run(&request()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Transport(_)));
        assert_eq!(client.transport().poll_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_processing_keeps_polling() {
        let mut polls: Vec<Result<PollReply, TransportError>> =
            (0..30).map(|_| Ok(PollReply::Processing)).collect();
        polls.push(Ok(PollReply::Completed {
            response: "finally".to_string(),
        }));

        let transport = ScriptedTransport::new(
            Ok(SendReply::Queued {
                message_id: "abc".to_string(),
            }),
            polls,
        );
        let client = ExchangeClient::new(transport).with_poll_interval(Duration::from_millis(100));

        let response = client.run(&request()).await.unwrap();
        assert_eq!(response, "finally");
        assert_eq!(client.transport().poll_count.load(Ordering::SeqCst), 31);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_reaches_transport_unchanged() {
        let transport = ScriptedTransport::new(
            Ok(SendReply::Immediate {
                response: "ok".to_string(),
            }),
            Vec::new(),
        );
        let client = ExchangeClient::new(transport);

        client.run(&request()).await.unwrap();
        let sent = client.transport().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].prompt, "hello");
        assert!(sent[0].history.is_empty());
    }
}
