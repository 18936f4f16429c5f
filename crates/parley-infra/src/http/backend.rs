//! HttpBackend -- concrete [`BackendTransport`] over reqwest.
//!
//! Talks to the assistant backend's three endpoints: `POST /send`,
//! `GET /get-response`, and `POST /change-provider`. Any network failure or
//! non-2xx status becomes a typed [`TransportError`] carrying the response
//! body, which the UI surfaces verbatim.

use std::time::Duration;

use parley_core::exchange::client::BackendTransport;
use parley_types::error::TransportError;
use parley_types::protocol::{PollReply, SendReply, SendRequest};

/// HTTP implementation of the backend transport.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a new backend client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-2xx response into a `TransportError` with its body.
    async fn error_for(response: reqwest::Response) -> TransportError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        TransportError::Http { status, body }
    }
}

impl BackendTransport for HttpBackend {
    async fn send_prompt(&self, request: &SendRequest) -> Result<SendReply, TransportError> {
        let response = self
            .client
            .post(self.url("/send"))
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        response
            .json::<SendReply>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn poll_response(&self, message_id: &str) -> Result<PollReply, TransportError> {
        let response = self
            .client
            .get(self.url("/get-response"))
            .query(&[("message_id", message_id)])
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        response
            .json::<PollReply>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn change_provider(&self, provider: &str) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.url("/change-provider"))
            .json(&serde_json::json!({ "provider": provider }))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(())
    }
}
