//! `WatcherSet`: runs one [`ChainWatcher`] per configured chain.
//!
//! Watchers share nothing but the store; a failure on one chain never
//! stops another.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use nttwatch_core::{
    Chain, MonitorConfig, ResumeTracker, StorageAdapter, WatchMode, WatcherError,
};

use crate::client::ChainClient;
use crate::finality::FinalityPolicy;
use crate::watcher::{ChainWatcher, WatcherState};

/// The external collaborators a chain's watcher needs.
#[derive(Clone)]
pub struct ChainBackend {
    pub client: Arc<dyn ChainClient>,
    pub finality: Arc<dyn FinalityPolicy>,
}

/// A set of watchers, not yet running.
#[derive(Default)]
pub struct WatcherSet {
    watchers: Vec<ChainWatcher>,
}

impl WatcherSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one watcher per entry of `config.chains`, all sharing `store`.
    ///
    /// `backend` supplies the client and finality policy for a chain; a
    /// configured chain without one is a configuration error.
    pub fn from_config(
        config: &MonitorConfig,
        store: Arc<dyn StorageAdapter>,
        mut backend: impl FnMut(Chain) -> Option<ChainBackend>,
    ) -> Result<Self, WatcherError> {
        config.validate()?;
        let deployments = Arc::new(config.deployments.clone());
        let mut set = Self::new();
        for chain_config in &config.chains {
            let chain = chain_config.chain;
            let ChainBackend { client, finality } = backend(chain).ok_or_else(|| {
                WatcherError::Config(format!("no chain client configured for {chain}"))
            })?;
            if client.chain() != chain {
                return Err(WatcherError::Config(format!(
                    "client for {} registered under {chain}",
                    client.chain()
                )));
            }
            let resume = ResumeTracker::new(store.clone(), deployments.clone(), config.network);
            set.push(ChainWatcher::new(
                chain_config.clone(),
                client,
                finality,
                store.clone(),
                resume,
            ));
        }
        Ok(set)
    }

    pub fn push(&mut self, watcher: ChainWatcher) {
        self.watchers.push(watcher);
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    /// Spawn one Tokio task per watcher. Returns immediately.
    pub fn spawn(self) -> WatcherSetHandle {
        info!(watchers = self.watchers.len(), "WatcherSet starting");
        let (shutdown, rx) = watch::channel(false);
        let mut tasks = Vec::with_capacity(self.watchers.len());
        let mut states = Vec::with_capacity(self.watchers.len());

        for watcher in self.watchers {
            let key = (watcher.chain(), watcher.mode());
            states.push((key.0, key.1, watcher.subscribe()));
            let rx = rx.clone();
            tasks.push((key.0, key.1, tokio::spawn(watcher.run(rx))));
        }

        WatcherSetHandle {
            shutdown,
            tasks,
            states,
        }
    }
}

/// Handle to a running [`WatcherSet`].
pub struct WatcherSetHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<(Chain, WatchMode, JoinHandle<()>)>,
    states: Vec<(Chain, WatchMode, watch::Receiver<WatcherState>)>,
}

impl WatcherSetHandle {
    /// Current state of every watcher.
    pub fn states(&self) -> Vec<(Chain, WatchMode, WatcherState)> {
        self.states
            .iter()
            .map(|(chain, mode, rx)| (*chain, *mode, *rx.borrow()))
            .collect()
    }

    /// Signal every watcher to stop and wait for in-flight cycles to finish.
    pub async fn shutdown(self) -> Result<(), WatcherError> {
        info!("WatcherSet shutting down");
        self.shutdown.send_replace(true);

        let (keys, handles): (Vec<_>, Vec<_>) = self
            .tasks
            .into_iter()
            .map(|(chain, mode, handle)| ((chain, mode), handle))
            .unzip();

        let mut failed = Vec::new();
        for ((chain, mode), result) in keys.into_iter().zip(join_all(handles).await) {
            if let Err(e) = result {
                error!(%chain, %mode, error = %e, "watcher task ended abnormally");
                failed.push(format!("{chain} ({mode})"));
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(WatcherError::Aborted {
                reason: format!("watcher task panicked: {}", failed.join(", ")),
            })
        }
    }
}
