//! Reading store abstraction and its backends
//!
//! Readings are kept in timestamp order. A store is cleared wholesale when a
//! sitting session ends; single records are never updated or removed.

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StorageConfig;
use crate::reading::Reading;

/// Ordered, append-only storage for pressure readings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Append a reading. Fails with `Persistence` when the timestamp is already stored.
    async fn insert(&self, reading: &Reading) -> crate::Result<()>;

    /// Remove every reading. Clearing an empty store is not an error.
    async fn clear(&self) -> crate::Result<()>;

    /// Atomically clear the store and insert `reading` as its only record.
    /// On failure the previous contents are left untouched.
    async fn replace_all(&self, reading: &Reading) -> crate::Result<()>;

    /// Reading with the greatest timestamp
    async fn latest(&self) -> crate::Result<Option<Reading>>;

    /// Reading with the smallest timestamp
    async fn earliest(&self) -> crate::Result<Option<Reading>>;

    /// Number of stored readings
    async fn count(&self) -> crate::Result<usize>;
}

/// Build the store selected by the configuration
pub fn open_store(config: &StorageConfig) -> crate::Result<Arc<dyn ReadingStore>> {
    match config {
        StorageConfig::Memory => {
            tracing::info!("Using in-memory reading store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageConfig::Sqlite { path } => {
            tracing::info!("Using SQLite reading store at {:?}", path);
            Ok(Arc::new(SqliteStore::open(path.clone())?))
        }
    }
}
