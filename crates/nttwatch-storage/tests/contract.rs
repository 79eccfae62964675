//! Behaviour every `StorageAdapter` backend must share.

use std::sync::Arc;

use nttwatch_core::keys::make_block_key;
use nttwatch_core::{
    Chain, DeploymentTable, Network, ResumeTracker, StorageAdapter, StorageConfig, VaasByBlock,
    WatchMode,
};
use nttwatch_storage::{open, InMemoryStorage, JsonFileStorage};

fn block_key(block: u64) -> String {
    make_block_key(block, &format!("2024-03-14T02:{:02}:{:02}.000Z", (block / 60) % 60, block % 60))
}

async fn exercise(store: Arc<dyn StorageAdapter>) {
    // empty store
    assert!(store
        .get_last_block_by_chain(Chain::Arbitrum, WatchMode::Vaa)
        .await
        .unwrap()
        .is_none());

    // cursor per (chain, mode)
    store
        .store_latest_block(Chain::Arbitrum, &block_key(41), WatchMode::Vaa)
        .await
        .unwrap();
    store
        .store_latest_block(Chain::Arbitrum, &block_key(7), WatchMode::Ntt)
        .await
        .unwrap();
    store
        .store_latest_block(Chain::Optimism, &block_key(99), WatchMode::Vaa)
        .await
        .unwrap();

    let tracker = ResumeTracker::new(store.clone(), Arc::new(DeploymentTable::new()), Network::Mainnet);
    assert_eq!(tracker.resume_block(Chain::Arbitrum, WatchMode::Vaa).await.unwrap(), Some(42));
    assert_eq!(tracker.resume_block(Chain::Arbitrum, WatchMode::Ntt).await.unwrap(), Some(8));
    assert_eq!(tracker.resume_block(Chain::Optimism, WatchMode::Vaa).await.unwrap(), Some(100));

    // idempotent message writes
    let mut batch = VaasByBlock::new();
    batch.insert(block_key(41), vec!["0xaa:23/e/1".into()]);
    store.store_vaas_by_block(Chain::Arbitrum, &batch).await.unwrap();
    store.store_vaas_by_block(Chain::Arbitrum, &batch).await.unwrap();
}

#[tokio::test]
async fn memory_backend_contract() {
    let store = Arc::new(InMemoryStorage::new());
    exercise(store.clone()).await;
    assert_eq!(store.message_count(), 1);
}

#[tokio::test]
async fn json_backend_contract() {
    let mut path = std::env::temp_dir();
    path.push(format!("nttwatch-contract-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let store = Arc::new(JsonFileStorage::open(&path).await.unwrap());
    exercise(store.clone()).await;
    assert_eq!(store.vaas_by_block(Chain::Arbitrum).await.values().map(Vec::len).sum::<usize>(), 1);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn open_from_config() {
    let store = open(&StorageConfig::Memory).await.unwrap();
    exercise(store).await;
}

#[tokio::test]
async fn concurrent_chains_do_not_interfere() {
    let mut path = std::env::temp_dir();
    path.push(format!("nttwatch-concurrent-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let store: Arc<dyn StorageAdapter> = Arc::new(JsonFileStorage::open(&path).await.unwrap());

    let mut handles = Vec::new();
    for chain in [Chain::Ethereum, Chain::Base, Chain::Celo, Chain::Fantom] {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for block in 1..=20u64 {
                let mut batch = VaasByBlock::new();
                batch.insert(block_key(block), vec![format!("0x{block:02x}:{}/e/{block}", chain.id())]);
                store.store_vaas_by_block(chain, &batch).await.unwrap();
                store
                    .store_latest_block(chain, &block_key(block), WatchMode::Vaa)
                    .await
                    .unwrap();
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let reopened = JsonFileStorage::open(&path).await.unwrap();
    for chain in [Chain::Ethereum, Chain::Base, Chain::Celo, Chain::Fantom] {
        let last = reopened
            .get_last_block_by_chain(chain, WatchMode::Vaa)
            .await
            .unwrap()
            .unwrap();
        assert!(last.starts_with("20/"));
        assert_eq!(reopened.vaas_by_block(chain).await.len(), 20);
    }

    let _ = std::fs::remove_file(&path);
}
