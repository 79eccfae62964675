//! Shared types for the watch pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ─── WatchMode ───────────────────────────────────────────────────────────────

/// Which message family a watcher follows.
///
/// A chain can run one watcher per mode; each mode keeps its own cursor and
/// its own initial-deployment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WatchMode {
    /// Generic core-bridge messages (VAAs).
    #[default]
    Vaa,
    /// Native Token Transfer manager/transceiver messages.
    Ntt,
}

impl WatchMode {
    pub fn is_ntt(self) -> bool {
        matches!(self, Self::Ntt)
    }
}

impl fmt::Display for WatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vaa => write!(f, "vaa"),
            Self::Ntt => write!(f, "ntt"),
        }
    }
}

// ─── VaasByBlock ─────────────────────────────────────────────────────────────

/// Block key (`"<block>/<timestamp>"`) → message identifiers observed in
/// that block, in observation order. Blocks without messages may be absent.
pub type VaasByBlock = BTreeMap<String, Vec<String>>;

/// Merge `incoming` into `existing`, appending only identifiers not already
/// present for the same block key. Re-inserting a block is a no-op.
pub fn merge_vaas_by_block(existing: &mut VaasByBlock, incoming: &VaasByBlock) {
    for (block_key, ids) in incoming {
        let entry = existing.entry(block_key.clone()).or_default();
        for id in ids {
            if !entry.contains(id) {
                entry.push(id.clone());
            }
        }
    }
}

/// Total number of message identifiers across all blocks.
pub fn message_count(vaas: &VaasByBlock) -> usize {
    vaas.values().map(Vec::len).sum()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
