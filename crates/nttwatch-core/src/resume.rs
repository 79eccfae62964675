//! Resume cursor: where a chain's watcher picks up after a restart.
//!
//! The persisted last block wins; without one, the watcher starts at the
//! chain's initial deployment block for the network. With neither, there is
//! no resume point and the chain is not watched, since starting at block
//! zero would mean scanning the whole chain.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::chain::{Chain, Network};
use crate::error::WatcherError;
use crate::keys::extract_block_from_key;
use crate::storage::StorageAdapter;
use crate::types::WatchMode;

type BlockTable = BTreeMap<Network, BTreeMap<Chain, u64>>;

/// Initial deployment blocks per network and chain, one table per
/// [`WatchMode`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentTable {
    /// Core-bridge deployment blocks.
    #[serde(default)]
    pub vaa: BlockTable,
    /// NTT manager deployment blocks.
    #[serde(default)]
    pub ntt: BlockTable,
}

impl DeploymentTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, mode: WatchMode) -> &BlockTable {
        match mode {
            WatchMode::Vaa => &self.vaa,
            WatchMode::Ntt => &self.ntt,
        }
    }

    /// Record an initial deployment block.
    pub fn insert(&mut self, network: Network, chain: Chain, mode: WatchMode, block: u64) {
        let table = match mode {
            WatchMode::Vaa => &mut self.vaa,
            WatchMode::Ntt => &mut self.ntt,
        };
        table.entry(network).or_default().insert(chain, block);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_block(mut self, network: Network, chain: Chain, mode: WatchMode, block: u64) -> Self {
        self.insert(network, chain, mode, block);
        self
    }

    /// The initial deployment block, if one is configured.
    pub fn initial_block(&self, network: Network, chain: Chain, mode: WatchMode) -> Option<u64> {
        self.table(mode).get(&network)?.get(&chain).copied()
    }
}

/// Computes the next block to fetch for a chain.
#[derive(Clone)]
pub struct ResumeTracker {
    store: Arc<dyn StorageAdapter>,
    deployments: Arc<DeploymentTable>,
    network: Network,
}

impl ResumeTracker {
    pub fn new(
        store: Arc<dyn StorageAdapter>,
        deployments: Arc<DeploymentTable>,
        network: Network,
    ) -> Self {
        Self {
            store,
            deployments,
            network,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// `last persisted block + 1`, else the initial deployment block, else
    /// `None`.
    pub async fn resume_block(
        &self,
        chain: Chain,
        mode: WatchMode,
    ) -> Result<Option<u64>, WatcherError> {
        if let Some(key) = self.store.get_last_block_by_chain(chain, mode).await? {
            let last = extract_block_from_key(&key)?;
            return Ok(Some(last.saturating_add(1)));
        }
        Ok(self.deployments.initial_block(self.network, chain, mode))
    }

    /// Like [`resume_block`](Self::resume_block), but a missing resume point
    /// is a [`WatcherError::ConfigurationGap`].
    pub async fn require_resume_block(
        &self,
        chain: Chain,
        mode: WatchMode,
    ) -> Result<u64, WatcherError> {
        self.resume_block(chain, mode)
            .await?
            .ok_or_else(|| WatcherError::ConfigurationGap {
                network: self.network.to_string(),
                chain: chain.to_string(),
                mode: mode.to_string(),
            })
    }
}
