//! Storage contract consumed by the chain watchers.
//!
//! Implementations live in `nttwatch-storage` (`InMemoryStorage`,
//! `JsonFileStorage`, `SqliteStorage`). One store is constructed at startup
//! and shared by every watcher as an `Arc<dyn StorageAdapter>`.

use async_trait::async_trait;

use crate::chain::Chain;
use crate::error::WatcherError;
use crate::types::{VaasByBlock, WatchMode};

/// Durable store for per-chain progress and observed messages.
///
/// Writers for different chains may call concurrently; an implementation
/// must keep their data isolated. Writes for a single chain are already
/// serialized because exactly one watcher owns each `(chain, mode)`.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// The last block key persisted for `chain` in `mode`, if any.
    async fn get_last_block_by_chain(
        &self,
        chain: Chain,
        mode: WatchMode,
    ) -> Result<Option<String>, WatcherError>;

    /// Persist `block_key` as the last fully processed block.
    async fn store_latest_block(
        &self,
        chain: Chain,
        block_key: &str,
        mode: WatchMode,
    ) -> Result<(), WatcherError>;

    /// Upsert observed messages, merging with existing entries for the same
    /// block key. Re-inserting an identifier already stored is a no-op.
    async fn store_vaas_by_block(
        &self,
        chain: Chain,
        vaas_by_block: &VaasByBlock,
    ) -> Result<(), WatcherError>;
}
