//! SQLite-backed persistence.

pub mod kv;
pub mod pool;
