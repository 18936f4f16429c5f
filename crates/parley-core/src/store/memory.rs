//! In-memory key-value store.
//!
//! Backs tests and ephemeral (no data dir) runs with the same `KvStore`
//! contract the SQLite implementation honors.

use dashmap::DashMap;
use parley_types::error::StoreError;

use super::kv::KvStore;

/// DashMap-backed `KvStore` with no persistence.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, serde_json::Value>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}
