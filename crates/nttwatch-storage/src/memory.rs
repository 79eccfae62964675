//! In-memory storage backend.
//!
//! Holds cursors and observed messages in RAM. Useful for tests and
//! short-lived watchers that don't need persistence.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use nttwatch_core::types::merge_vaas_by_block;
use nttwatch_core::{Chain, StorageAdapter, VaasByBlock, WatchMode, WatcherError};

/// In-memory watcher storage.
///
/// All data is lost when the process exits.
#[derive(Default)]
pub struct InMemoryStorage {
    last_blocks: Mutex<HashMap<(Chain, WatchMode), String>>,
    vaas: Mutex<HashMap<Chain, VaasByBlock>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything stored for `chain` so far.
    pub fn vaas_by_block(&self, chain: Chain) -> VaasByBlock {
        self.vaas.lock().unwrap().get(&chain).cloned().unwrap_or_default()
    }

    /// Total number of stored message identifiers across all chains.
    pub fn message_count(&self) -> usize {
        self.vaas
            .lock()
            .unwrap()
            .values()
            .map(nttwatch_core::types::message_count)
            .sum()
    }
}

#[async_trait]
impl StorageAdapter for InMemoryStorage {
    async fn get_last_block_by_chain(
        &self,
        chain: Chain,
        mode: WatchMode,
    ) -> Result<Option<String>, WatcherError> {
        Ok(self.last_blocks.lock().unwrap().get(&(chain, mode)).cloned())
    }

    async fn store_latest_block(
        &self,
        chain: Chain,
        block_key: &str,
        mode: WatchMode,
    ) -> Result<(), WatcherError> {
        self.last_blocks
            .lock()
            .unwrap()
            .insert((chain, mode), block_key.to_string());
        Ok(())
    }

    async fn store_vaas_by_block(
        &self,
        chain: Chain,
        vaas_by_block: &VaasByBlock,
    ) -> Result<(), WatcherError> {
        let mut vaas = self.vaas.lock().unwrap();
        merge_vaas_by_block(vaas.entry(chain).or_default(), vaas_by_block);
        Ok(())
    }
}
