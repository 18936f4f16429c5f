//! Business logic for the Parley chat client.
//!
//! This crate holds everything with real state-machine or protocol-timing
//! complexity: the persisted chat store, the sanitized Markdown renderer and
//! typewriter reveal engine, the submit/poll exchange client, and the
//! controller that ties the message lifecycle together.
//!
//! Infrastructure (SQLite, HTTP) lives in parley-infra; the host UI plugs in
//! behind the `ConversationView` and `RevealTarget` traits.

pub mod controller;
pub mod exchange;
pub mod render;
pub mod store;
