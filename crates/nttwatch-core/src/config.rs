//! Watcher configuration.
//!
//! A deployment is described by one [`MonitorConfig`] JSON document:
//!
//! ```json
//! {
//!   "network": "Mainnet",
//!   "storage": { "kind": "json", "path": "./db.json" },
//!   "chains": [
//!     { "chain": "Solana", "mode": "ntt", "poll_interval_ms": 1000 },
//!     { "chain": "Polygon", "max_block_range": 50 }
//!   ],
//!   "deployments": { "vaa": { "Mainnet": { "Polygon": 20629146 } } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chain::{Chain, Network};
use crate::error::WatcherError;
use crate::resume::DeploymentTable;
use crate::retry::RetryConfig;
use crate::types::WatchMode;

/// Per-chain watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainWatchConfig {
    /// Chain to watch.
    pub chain: Chain,
    /// Message family to follow.
    #[serde(default)]
    pub mode: WatchMode,
    /// Sleep between poll cycles (milliseconds).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Maximum number of blocks fetched per cycle.
    #[serde(default = "default_max_block_range")]
    pub max_block_range: u64,
    /// Timeout applied to every chain client and store call (milliseconds).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Step-level retry policy.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_poll_interval_ms() -> u64 { 5_000 }
fn default_max_block_range() -> u64 { 100 }
fn default_request_timeout_ms() -> u64 { 30_000 }

impl ChainWatchConfig {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            mode: WatchMode::default(),
            poll_interval_ms: default_poll_interval_ms(),
            max_block_range: default_max_block_range(),
            request_timeout_ms: default_request_timeout_ms(),
            retry: RetryConfig::default(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Reject settings the watcher cannot run with.
    pub fn validate(&self) -> Result<(), WatcherError> {
        if self.max_block_range == 0 {
            return Err(WatcherError::Config(format!(
                "{}: max_block_range must be at least 1",
                self.chain
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(WatcherError::Config(format!(
                "{}: request_timeout_ms must be positive",
                self.chain
            )));
        }
        Ok(())
    }
}

/// Which [`StorageAdapter`](crate::storage::StorageAdapter) backend to open.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Ephemeral, process-local.
    #[default]
    Memory,
    /// Single JSON document on disk.
    Json { path: PathBuf },
    /// SQLite database (requires the `sqlite` feature of `nttwatch-storage`).
    Sqlite { path: PathBuf },
}

/// Log level per component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: component_name → level
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: HashMap::new(),
            json: false,
        }
    }
}

/// Top-level configuration for a set of chain watchers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub network: Network,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub chains: Vec<ChainWatchConfig>,
    #[serde(default)]
    pub deployments: DeploymentTable,
}

impl MonitorConfig {
    /// Parse a config document.
    pub fn from_json(json: &str) -> Result<Self, WatcherError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| WatcherError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WatcherError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| WatcherError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Every chain config must be valid and each `(chain, mode)` pair may
    /// appear only once, since one watcher owns a cursor.
    pub fn validate(&self) -> Result<(), WatcherError> {
        let mut seen = std::collections::HashSet::new();
        for chain in &self.chains {
            chain.validate()?;
            if !seen.insert((chain.chain, chain.mode)) {
                return Err(WatcherError::Config(format!(
                    "{} ({}) is configured more than once",
                    chain.chain, chain.mode
                )));
            }
        }
        Ok(())
    }
}
