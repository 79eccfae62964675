//! Finality policies: how far a chain is considered final.
//!
//! One generic watcher runs every chain; the chain-specific part is the
//! single [`FinalityPolicy::finalized_block_number`] call.

use async_trait::async_trait;

use nttwatch_core::WatcherError;

use crate::client::ChainClient;

#[async_trait]
pub trait FinalityPolicy: Send + Sync {
    /// Highest block that is safe to process.
    async fn finalized_block_number(&self, client: &dyn ChainClient) -> Result<u64, WatcherError>;
}

/// The client's latest block is final (chains with native finality, or
/// clients that already query at a finalized commitment).
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestBlock;

#[async_trait]
impl FinalityPolicy for LatestBlock {
    async fn finalized_block_number(&self, client: &dyn ChainClient) -> Result<u64, WatcherError> {
        client.latest_block_number().await
    }
}

/// Final once `n` blocks deep: `head - n`.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationDepth(pub u64);

#[async_trait]
impl FinalityPolicy for ConfirmationDepth {
    async fn finalized_block_number(&self, client: &dyn ChainClient) -> Result<u64, WatcherError> {
        Ok(client.latest_block_number().await?.saturating_sub(self.0))
    }
}

/// Parent-chain view of a child chain, e.g. the Polygon root chain contract
/// on Ethereum.
#[async_trait]
pub trait RootChainClient: Send + Sync {
    /// Last child-chain block committed to the parent chain.
    async fn last_child_block(&self) -> Result<u64, WatcherError>;
}

/// Final once checkpointed to the parent chain.
pub struct RootChainCheckpoint<R> {
    root: R,
}

impl<R: RootChainClient> RootChainCheckpoint<R> {
    pub fn new(root: R) -> Self {
        Self { root }
    }
}

#[async_trait]
impl<R: RootChainClient> FinalityPolicy for RootChainCheckpoint<R> {
    async fn finalized_block_number(&self, _client: &dyn ChainClient) -> Result<u64, WatcherError> {
        let block = self.root.last_child_block().await?;
        tracing::info!(block, "rooted child block");
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RawBlock, RawTransaction};
    use nttwatch_core::Chain;

    struct Head(u64);

    #[async_trait]
    impl ChainClient for Head {
        fn chain(&self) -> Chain {
            Chain::Polygon
        }
        async fn latest_block_number(&self) -> Result<u64, WatcherError> {
            Ok(self.0)
        }
        async fn blocks_in_range(&self, _: u64, _: u64) -> Result<Vec<RawBlock>, WatcherError> {
            Ok(vec![])
        }
        async fn transaction(&self, _: &str) -> Result<Option<RawTransaction>, WatcherError> {
            Ok(None)
        }
    }

    struct Root(u64);

    #[async_trait]
    impl RootChainClient for Root {
        async fn last_child_block(&self) -> Result<u64, WatcherError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn latest_block_is_head() {
        assert_eq!(LatestBlock.finalized_block_number(&Head(500)).await.unwrap(), 500);
    }

    #[tokio::test]
    async fn confirmation_depth_saturates() {
        assert_eq!(ConfirmationDepth(64).finalized_block_number(&Head(500)).await.unwrap(), 436);
        assert_eq!(ConfirmationDepth(64).finalized_block_number(&Head(10)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn root_chain_ignores_child_head() {
        let policy = RootChainCheckpoint::new(Root(480));
        assert_eq!(policy.finalized_block_number(&Head(500)).await.unwrap(), 480);
    }
}
