//! nttwatch-core — foundation for the resumable multi-chain message watcher.
//!
//! # Architecture
//!
//! ```text
//! WatcherSet → ChainWatcher (one per chain)
//!                  ├── FinalityPolicy   (chain-specific finalized height)
//!                  ├── ResumeTracker    (persisted cursor / deployment block)
//!                  ├── MessageCodec     (nttwatch-codec)
//!                  ├── KeyCodec         (order-preserving string keys)
//!                  └── StorageAdapter   (memory / JSON file / SQLite)
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod keys;
pub mod resume;
pub mod retry;
pub mod storage;
pub mod types;

pub use chain::{chain_id_to_name, Chain, Network};
pub use config::{ChainWatchConfig, LogConfig, MonitorConfig, StorageConfig};
pub use error::WatcherError;
pub use keys::{MessageId, VaaKey};
pub use resume::{DeploymentTable, ResumeTracker};
pub use retry::{RetryConfig, RetryPolicy};
pub use storage::StorageAdapter;
pub use types::{VaasByBlock, WatchMode};
