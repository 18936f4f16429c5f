//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `parley-core` using sqlx with split read/write
//! pools. Values are stored as JSON text and deserialized on read; every
//! write replaces the whole value for its key.

use chrono::Utc;
use parley_core::store::kv::KvStore;
use parley_types::error::StoreError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    /// Create a new KV store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        match row {
            Some(row) => {
                let value_str: String = row
                    .try_get("value")
                    .map_err(|e| StoreError::Storage(e.to_string()))?;
                let value: serde_json::Value = serde_json::from_str(&value_str)
                    .map_err(|e| StoreError::Storage(format!("invalid JSON value: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let value_str = serde_json::to_string(value)
            .map_err(|e| StoreError::Storage(format!("failed to serialize value: {e}")))?;

        sqlx::query(
            r#"INSERT INTO kv_store (key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(&value_str)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut keys = Vec::with_capacity(rows.len());
        for row in &rows {
            let key: String = row
                .try_get("key")
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            keys.push(key);
        }

        Ok(keys)
    }
}
