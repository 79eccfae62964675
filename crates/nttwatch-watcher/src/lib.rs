//! nttwatch-watcher — per-chain poll loop and supervision.

pub mod builder;
pub mod client;
pub mod decode;
pub mod finality;
pub mod set;
pub mod watcher;

pub use builder::WatcherBuilder;
pub use client::{ChainClient, RawBlock, RawMessage, RawTransaction};
pub use finality::{ConfirmationDepth, FinalityPolicy, LatestBlock, RootChainCheckpoint, RootChainClient};
pub use set::{ChainBackend, WatcherSet, WatcherSetHandle};
pub use watcher::{ChainWatcher, CycleOutcome, WatcherState};
