//! Key-value store trait.
//!
//! Defines the interface for the client's persistent key-value storage.
//! Implementations live in parley-infra.

use parley_types::error::StoreError;

/// Trait for installation-wide key-value persistent storage.
///
/// Stores arbitrary JSON values under string keys. Every write replaces the
/// whole value for its key; there is no partial-write protocol, so the last
/// writer wins. That is acceptable for a single-client store and is the
/// documented scope of this trait.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, StoreError>> + Send;

    /// Set a value for a key (whole-value upsert).
    fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Remove a key. No-op if the key does not exist.
    fn remove(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// List all stored keys.
    fn keys(&self) -> impl std::future::Future<Output = Result<Vec<String>, StoreError>> + Send;
}
