//! Chain client contract.
//!
//! Concrete RPC clients live outside this crate; the watcher only needs the
//! chain head, the blocks in a range, and single-transaction lookups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use nttwatch_core::{Chain, WatcherError};

/// A message-bearing item found in a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMessage {
    /// A core-bridge message, addressed by emitter and sequence.
    Vaa { emitter: String, sequence: u64 },
    /// Wire-format `TransceiverMessage` bytes (e.g. from an EVM log).
    NttWire(Vec<u8>),
    /// Account-format `ValidatedTransceiverMessage` bytes (Solana).
    NttAccount(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    /// Transaction hash or signature.
    pub hash: String,
    pub messages: Vec<RawMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub number: u64,
    pub timestamp: DateTime<Utc>,
    pub transactions: Vec<RawTransaction>,
}

/// Trait for fetching chain data from a node or indexer.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The chain this client talks to.
    fn chain(&self) -> Chain;

    /// Current head height.
    async fn latest_block_number(&self) -> Result<u64, WatcherError>;

    /// Blocks in `[from, to]`, ascending. Heights without a block (skipped
    /// slots) are simply absent.
    async fn blocks_in_range(&self, from: u64, to: u64) -> Result<Vec<RawBlock>, WatcherError>;

    /// A single transaction by hash or signature.
    async fn transaction(&self, hash: &str) -> Result<Option<RawTransaction>, WatcherError>;
}
