use thiserror::Error;

/// Errors from chat store operations.
///
/// Operations on an unknown chat id report `UnknownChat` without mutating
/// anything; the UI layer decides how to surface it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown chat id")]
    UnknownChat,

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from the backend transport (network / non-2xx / undecodable body).
///
/// All of these are terminal for an exchange: nothing pollable was obtained.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed backend reply: {0}")]
    Decode(String),
}

/// Terminal failure of one prompt/response exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by the chat controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("an exchange is already in flight for this session")]
    ExchangeInFlight,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
