//! Shared domain types for Parley.
//!
//! This crate contains the core domain types used across the Parley client:
//! chat sessions, messages, backend wire types, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, thiserror.

pub mod chat;
pub mod error;
pub mod protocol;
pub mod provider;
