//! Client profile state: provider selection, theme, installation identity.
//!
//! These live beside the conversation keys in the same key-value store and
//! survive restarts. The `session_id` is the stable identity sent to the
//! backend with every prompt; it is generated once per installation.

use parley_types::error::StoreError;
use parley_types::provider::DEFAULT_PROVIDER;
use uuid::Uuid;

use super::kv::KvStore;

/// Key holding the selected backend provider.
pub const PROVIDER_KEY: &str = "llmProvider";

/// Key holding the display theme (`dark` / `light`).
pub const THEME_KEY: &str = "theme";

/// Key holding the stable per-installation identity.
pub const SESSION_ID_KEY: &str = "session_id";

/// Accessors for profile keys on top of a [`KvStore`].
pub struct ProfileStore<K: KvStore> {
    kv: K,
}

impl<K: KvStore> ProfileStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// The selected provider, defaulting when none was ever persisted.
    pub async fn provider(&self) -> Result<String, StoreError> {
        Ok(self
            .read_string(PROVIDER_KEY)
            .await?
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()))
    }

    pub async fn set_provider(&self, provider: &str) -> Result<(), StoreError> {
        self.write_string(PROVIDER_KEY, provider).await
    }

    /// The display theme, defaulting to dark.
    pub async fn theme(&self) -> Result<String, StoreError> {
        Ok(self
            .read_string(THEME_KEY)
            .await?
            .unwrap_or_else(|| "dark".to_string()))
    }

    pub async fn set_theme(&self, theme: &str) -> Result<(), StoreError> {
        self.write_string(THEME_KEY, theme).await
    }

    /// The per-installation identity, generated and persisted on first use.
    pub async fn session_id(&self) -> Result<String, StoreError> {
        if let Some(existing) = self.read_string(SESSION_ID_KEY).await? {
            return Ok(existing);
        }
        let fresh = Uuid::new_v4().to_string();
        self.write_string(SESSION_ID_KEY, &fresh).await?;
        Ok(fresh)
    }

    async fn read_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.kv.get(key).await? {
            Some(serde_json::Value::String(s)) => Ok(Some(s)),
            Some(_) | None => Ok(None),
        }
    }

    async fn write_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.kv
            .set(key, &serde_json::Value::String(value.to_string()))
            .await
    }
}
