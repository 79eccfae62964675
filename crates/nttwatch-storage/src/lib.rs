//! nttwatch-storage — pluggable storage backends for NttWatch.
//!
//! Backends:
//! - [`memory`] — in-memory (dev/testing, no persistence)
//! - [`json`] — one JSON document on disk, rewritten atomically
//! - `sqlite` — SQLite via `sqlx` (feature `sqlite`)

use std::sync::Arc;

use nttwatch_core::{StorageAdapter, StorageConfig, WatcherError};

pub mod json;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use json::JsonFileStorage;
pub use memory::InMemoryStorage;

/// Open the backend named by `config`.
pub async fn open(config: &StorageConfig) -> Result<Arc<dyn StorageAdapter>, WatcherError> {
    match config {
        StorageConfig::Memory => Ok(Arc::new(InMemoryStorage::new())),
        StorageConfig::Json { path } => Ok(Arc::new(JsonFileStorage::open(path).await?)),
        #[cfg(feature = "sqlite")]
        StorageConfig::Sqlite { path } => {
            let path = path.to_string_lossy();
            Ok(Arc::new(sqlite::SqliteStorage::open(&path).await?))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageConfig::Sqlite { .. } => Err(WatcherError::Config(
            "sqlite storage requested but nttwatch-storage was built without the `sqlite` feature"
                .into(),
        )),
    }
}
