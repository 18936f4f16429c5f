//! Application state wiring persistence and backend access together.
//!
//! AppState holds what every command needs: the database pool, the data
//! directory, and the backend endpoint. Stores are built on demand from the
//! pool (they are cheap handles over it).

use std::path::PathBuf;

use parley_core::store::chats::ChatStore;
use parley_core::store::profile::ProfileStore;
use parley_infra::sqlite::kv::SqliteKvStore;
use parley_infra::sqlite::pool::{DatabasePool, resolve_data_dir};
use parley_types::provider::DEFAULT_MODEL;

/// Concrete store types pinned to the SQLite implementation.
pub type ConcreteChatStore = ChatStore<SqliteKvStore>;
pub type ConcreteProfileStore = ProfileStore<SqliteKvStore>;

/// Shared application state for all CLI commands.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabasePool,
    pub data_dir: PathBuf,
    pub backend_url: String,
    pub model: String,
}

impl AppState {
    /// Initialize the application state: resolve the data dir, connect to
    /// the database, read endpoint configuration from the environment.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("parley.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        let backend_url = std::env::var("PARLEY_BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let model = std::env::var("PARLEY_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            db_pool,
            data_dir,
            backend_url,
            model,
        })
    }

    /// A key-value store handle over the shared pool.
    pub fn kv(&self) -> SqliteKvStore {
        SqliteKvStore::new(self.db_pool.clone())
    }

    /// The conversation store.
    pub fn chat_store(&self) -> ConcreteChatStore {
        ChatStore::new(self.kv())
    }

    /// The profile store (provider, theme, client identity).
    pub fn profile(&self) -> ConcreteProfileStore {
        ProfileStore::new(self.kv())
    }
}
