//! Infrastructure implementations for Parley.
//!
//! Concrete backing for the trait seams in parley-core: a SQLite key-value
//! store (sqlx, WAL, split reader/writer pools) and the reqwest HTTP
//! transport for the assistant backend.

pub mod http;
pub mod sqlite;
