//! Fluent builder API for creating chain watchers.
//!
//! # Example
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use nttwatch_core::{Network, WatchMode, WatcherError};
//! # use nttwatch_watcher::{ChainClient, ConfirmationDepth, WatcherBuilder};
//! # fn example(client: Arc<dyn ChainClient>) -> Result<(), WatcherError> {
//! let store = Arc::new(nttwatch_storage::InMemoryStorage::new());
//! let watcher = WatcherBuilder::new(client)
//!     .network(Network::Mainnet)
//!     .mode(WatchMode::Ntt)
//!     .finality(Arc::new(ConfirmationDepth(32)))
//!     .max_block_range(50)
//!     .store(store)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use nttwatch_core::{
    ChainWatchConfig, DeploymentTable, Network, ResumeTracker, RetryConfig, StorageAdapter,
    WatchMode, WatcherError,
};

use crate::client::ChainClient;
use crate::finality::{FinalityPolicy, LatestBlock};
use crate::watcher::ChainWatcher;

/// Fluent builder for [`ChainWatcher`].
pub struct WatcherBuilder {
    config: ChainWatchConfig,
    client: Arc<dyn ChainClient>,
    network: Network,
    deployments: Arc<DeploymentTable>,
    finality: Arc<dyn FinalityPolicy>,
    store: Option<Arc<dyn StorageAdapter>>,
}

impl WatcherBuilder {
    /// Start a watcher for the chain `client` talks to.
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self {
            config: ChainWatchConfig::new(client.chain()),
            client,
            network: Network::Mainnet,
            deployments: Arc::new(DeploymentTable::new()),
            finality: Arc::new(LatestBlock),
            store: None,
        }
    }

    /// Replace all per-chain settings at once.
    pub fn config(mut self, config: ChainWatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn mode(mut self, mode: WatchMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Initial deployment blocks, used when nothing is persisted yet.
    pub fn deployments(mut self, deployments: Arc<DeploymentTable>) -> Self {
        self.deployments = deployments;
        self
    }

    pub fn finality(mut self, finality: Arc<dyn FinalityPolicy>) -> Self {
        self.finality = finality;
        self
    }

    pub fn store(mut self, store: Arc<dyn StorageAdapter>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the sleep between cycles in milliseconds.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Set the maximum number of blocks per cycle.
    pub fn max_block_range(mut self, blocks: u64) -> Self {
        self.config.max_block_range = blocks;
        self
    }

    /// Set the timeout for each external call in milliseconds.
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Build the watcher. Fails without a store, with invalid settings, or
    /// when the config names a different chain than the client.
    pub fn build(self) -> Result<ChainWatcher, WatcherError> {
        let store = self
            .store
            .ok_or_else(|| WatcherError::Config("watcher has no store".into()))?;
        self.config.validate()?;
        if self.config.chain != self.client.chain() {
            return Err(WatcherError::Config(format!(
                "config is for {} but client is for {}",
                self.config.chain,
                self.client.chain()
            )));
        }
        let resume = ResumeTracker::new(store.clone(), self.deployments, self.network);
        Ok(ChainWatcher::new(self.config, self.client, self.finality, store, resume))
    }
}
