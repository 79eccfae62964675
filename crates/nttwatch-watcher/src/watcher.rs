//! The per-chain poll loop.
//!
//! Each cycle walks the same states:
//!
//! ```text
//! Idle → DetermineFinality → ComputeRange → Fetch → Decode → Persist → Sleep
//!                                 │
//!                                 └── nothing new → Sleep
//! ```
//!
//! Every external call goes through [`retry_step`], so a transient failure
//! is retried in place and, once retries run out, ends the cycle without
//! touching the cursor. Messages are written before the cursor, so a crash
//! between the two replays the range instead of losing it.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use nttwatch_core::keys::{block_key_at, make_block_key};
use nttwatch_core::retry::retry_step;
use nttwatch_core::{
    Chain, ChainWatchConfig, ResumeTracker, RetryPolicy, StorageAdapter, VaasByBlock, WatchMode,
    WatcherError,
};

use crate::client::ChainClient;
use crate::decode::{decode_block, transaction_message_ids};
use crate::finality::FinalityPolicy;

/// Timestamp used for a cursor key when the range returned no blocks.
const UNKNOWN_TIMESTAMP: &str = "1970-01-01T00:00:00.000Z";

/// Where a watcher is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    DetermineFinality,
    ComputeRange,
    Fetch,
    Decode,
    Persist,
    Sleep,
    Stopped,
}

impl fmt::Display for WatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::DetermineFinality => "determine_finality",
            Self::ComputeRange => "compute_range",
            Self::Fetch => "fetch",
            Self::Decode => "decode",
            Self::Persist => "persist",
            Self::Sleep => "sleep",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Result of a single [`ChainWatcher::poll_once`] cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// No persisted cursor and no deployment block; the chain stays idle.
    NoResumePoint,
    /// The cursor is already past the finalized frontier.
    UpToDate { next: u64, finalized: u64 },
    /// `[from, to]` was fetched, decoded, and persisted.
    Processed {
        from: u64,
        to: u64,
        messages: usize,
        skipped: usize,
    },
    /// A step exhausted its retries or failed permanently.
    Failed { step: &'static str, error: WatcherError },
}

/// Watches one `(chain, mode)` pair.
pub struct ChainWatcher {
    config: ChainWatchConfig,
    client: Arc<dyn ChainClient>,
    finality: Arc<dyn FinalityPolicy>,
    store: Arc<dyn StorageAdapter>,
    resume: ResumeTracker,
    retry: RetryPolicy,
    /// Next block to fetch, once known. Only ever moves forward.
    next_block: Option<u64>,
    gap_logged: bool,
    state: watch::Sender<WatcherState>,
}

impl ChainWatcher {
    pub fn new(
        config: ChainWatchConfig,
        client: Arc<dyn ChainClient>,
        finality: Arc<dyn FinalityPolicy>,
        store: Arc<dyn StorageAdapter>,
        resume: ResumeTracker,
    ) -> Self {
        let retry = RetryPolicy::new(config.retry.clone());
        let (state, _) = watch::channel(WatcherState::Idle);
        Self {
            config,
            client,
            finality,
            store,
            resume,
            retry,
            next_block: None,
            gap_logged: false,
            state,
        }
    }

    pub fn chain(&self) -> Chain {
        self.config.chain
    }

    pub fn mode(&self) -> WatchMode {
        self.config.mode
    }

    pub fn config(&self) -> &ChainWatchConfig {
        &self.config
    }

    pub fn state(&self) -> WatcherState {
        *self.state.borrow()
    }

    /// Follow state changes, e.g. from a supervisor.
    pub fn subscribe(&self) -> watch::Receiver<WatcherState> {
        self.state.subscribe()
    }

    /// Next block to fetch, if a cycle has resolved it.
    pub fn next_block(&self) -> Option<u64> {
        self.next_block
    }

    fn set_state(&self, state: WatcherState) {
        self.state.send_replace(state);
    }

    fn fail(&self, step: &'static str, error: WatcherError) -> CycleOutcome {
        error!(
            chain = %self.config.chain,
            mode = %self.config.mode,
            next = ?self.next_block,
            step,
            error = %error,
            "cycle failed, cursor unchanged"
        );
        self.set_state(WatcherState::Sleep);
        CycleOutcome::Failed { step, error }
    }

    /// Run exactly one cycle.
    pub async fn poll_once(&mut self) -> CycleOutcome {
        let chain = self.config.chain;
        let mode = self.config.mode;
        let timeout = self.config.request_timeout();

        // ── DetermineFinality ────────────────────────────────────────────────
        self.set_state(WatcherState::DetermineFinality);
        let finalized = match retry_step(&self.retry, timeout, "finality", || {
            self.finality.finalized_block_number(self.client.as_ref())
        })
        .await
        {
            Ok(block) => block,
            Err(e) => return self.fail("finality", e),
        };

        // ── ComputeRange ─────────────────────────────────────────────────────
        self.set_state(WatcherState::ComputeRange);
        let from = match self.next_block {
            Some(next) => next,
            None => {
                let resumed = retry_step(&self.retry, timeout, "resume", || {
                    self.resume.resume_block(chain, mode)
                })
                .await;
                match resumed {
                    Ok(Some(next)) => {
                        info!(%chain, %mode, next, "resuming");
                        self.next_block = Some(next);
                        next
                    }
                    Ok(None) => {
                        if !self.gap_logged {
                            let gap = WatcherError::ConfigurationGap {
                                network: self.resume.network().to_string(),
                                chain: chain.to_string(),
                                mode: mode.to_string(),
                            };
                            warn!(%chain, %mode, "{gap}; not watching");
                            self.gap_logged = true;
                        }
                        self.set_state(WatcherState::Idle);
                        return CycleOutcome::NoResumePoint;
                    }
                    Err(e) => return self.fail("resume", e),
                }
            }
        };

        if from > finalized {
            debug!(%chain, %mode, next = from, finalized, "up to date");
            self.set_state(WatcherState::Sleep);
            return CycleOutcome::UpToDate {
                next: from,
                finalized,
            };
        }
        let span = self.config.max_block_range.max(1) - 1;
        let to = finalized.min(from.saturating_add(span));

        // ── Fetch ────────────────────────────────────────────────────────────
        self.set_state(WatcherState::Fetch);
        let blocks = match retry_step(&self.retry, timeout, "fetch", || {
            self.client.blocks_in_range(from, to)
        })
        .await
        {
            Ok(blocks) => blocks,
            Err(e) => return self.fail("fetch", e),
        };

        // ── Decode ───────────────────────────────────────────────────────────
        self.set_state(WatcherState::Decode);
        let mut vaas = VaasByBlock::new();
        let mut messages = 0;
        let mut skipped = 0;
        let mut last_timestamp = None;
        for block in &blocks {
            if block.number < from || block.number > to {
                warn!(%chain, block = block.number, from, to, "client returned block outside range");
                continue;
            }
            let decoded = decode_block(chain, mode, block);
            skipped += decoded.skipped;
            last_timestamp = Some(block.timestamp);
            if !decoded.ids.is_empty() {
                messages += decoded.ids.len();
                vaas.entry(decoded.block_key).or_default().extend(decoded.ids);
            }
        }
        let cursor_key = match last_timestamp {
            Some(ts) => block_key_at(to, ts),
            None => make_block_key(to, UNKNOWN_TIMESTAMP),
        };

        // ── Persist ──────────────────────────────────────────────────────────
        self.set_state(WatcherState::Persist);
        if !vaas.is_empty() {
            if let Err(e) = retry_step(&self.retry, timeout, "store_messages", || {
                self.store.store_vaas_by_block(chain, &vaas)
            })
            .await
            {
                return self.fail("store_messages", e);
            }
        }
        if let Err(e) = retry_step(&self.retry, timeout, "store_cursor", || {
            self.store.store_latest_block(chain, &cursor_key, mode)
        })
        .await
        {
            return self.fail("store_cursor", e);
        }
        let next = to.saturating_add(1);
        self.next_block = Some(self.next_block.map_or(next, |n| n.max(next)));

        info!(%chain, %mode, from, to, messages, skipped, "range processed");
        self.set_state(WatcherState::Sleep);
        CycleOutcome::Processed {
            from,
            to,
            messages,
            skipped,
        }
    }

    /// Decode a single transaction by hash, for targeted lookups.
    pub async fn messages_for_transaction(
        &self,
        hash: &str,
    ) -> Result<Option<Vec<String>>, WatcherError> {
        let tx = retry_step(&self.retry, self.config.request_timeout(), "transaction", || {
            self.client.transaction(hash)
        })
        .await?;
        Ok(tx.map(|tx| transaction_message_ids(self.config.chain, self.config.mode, &tx).0))
    }

    /// Poll until `shutdown` flips to `true` (or its sender is dropped).
    ///
    /// A cycle that is already running completes before the loop exits;
    /// only the inter-cycle sleep is cut short.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let chain = self.config.chain;
        let mode = self.config.mode;
        info!(%chain, %mode, poll_interval_ms = self.config.poll_interval_ms, "watcher started");

        loop {
            let stop = *shutdown.borrow();
            if stop {
                break;
            }
            self.poll_once().await;
            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval()) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.set_state(WatcherState::Stopped);
        info!(%chain, %mode, next = ?self.next_block, "watcher stopped");
    }
}
