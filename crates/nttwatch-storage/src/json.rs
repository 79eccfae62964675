//! Flat-file JSON storage backend.
//!
//! The whole store is one JSON document:
//!
//! ```json
//! {
//!   "last_blocks": { "vaa": { "Polygon": "20629146/2021-08-05T06:59:59.000Z" } },
//!   "vaas_by_block": { "Polygon": { "20629146/2021-08-05T06:59:59.000Z": ["0xabc:5/…/12"] } }
//! }
//! ```
//!
//! Every write rewrites the document to a sibling temp file and renames it
//! over the previous file, so a crash leaves either the old or the new version.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use nttwatch_core::types::merge_vaas_by_block;
use nttwatch_core::{Chain, StorageAdapter, VaasByBlock, WatchMode, WatcherError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    last_blocks: BTreeMap<WatchMode, BTreeMap<Chain, String>>,
    #[serde(default)]
    vaas_by_block: BTreeMap<Chain, VaasByBlock>,
}

/// Single-file JSON store.
///
/// Writes from different chains are serialized through an async mutex.
pub struct JsonFileStorage {
    path: PathBuf,
    doc: Mutex<Document>,
}

impl JsonFileStorage {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, WatcherError> {
        let path = path.as_ref().to_path_buf();
        let doc = match tokio::fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => Document::default(),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| WatcherError::Storage(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Document::default(),
            Err(e) => return Err(WatcherError::Storage(format!("{}: {e}", path.display()))),
        };
        debug!(path = %path.display(), "opened json store");
        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Everything stored for `chain` so far.
    pub async fn vaas_by_block(&self, chain: Chain) -> VaasByBlock {
        self.doc
            .lock()
            .await
            .vaas_by_block
            .get(&chain)
            .cloned()
            .unwrap_or_default()
    }

    /// Apply `update` to a copy of the document, persist it, then commit it
    /// in memory. A failed write leaves both disk and memory unchanged.
    async fn write_with(&self, update: impl FnOnce(&mut Document)) -> Result<(), WatcherError> {
        let mut doc = self.doc.lock().await;
        let mut next = doc.clone();
        update(&mut next);
        self.persist(&next).await?;
        *doc = next;
        Ok(())
    }

    async fn persist(&self, doc: &Document) -> Result<(), WatcherError> {
        let storage_err = |e: std::io::Error| WatcherError::Storage(format!("{}: {e}", self.path.display()));

        let json = serde_json::to_vec_pretty(doc).map_err(|e| WatcherError::Storage(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(storage_err)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let mut file = tokio::fs::File::create(&tmp).await.map_err(storage_err)?;
        file.write_all(&json).await.map_err(storage_err)?;
        // data must be on disk before the rename makes it visible
        file.sync_all().await.map_err(storage_err)?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await.map_err(storage_err)?;
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for JsonFileStorage {
    async fn get_last_block_by_chain(
        &self,
        chain: Chain,
        mode: WatchMode,
    ) -> Result<Option<String>, WatcherError> {
        let doc = self.doc.lock().await;
        Ok(doc.last_blocks.get(&mode).and_then(|m| m.get(&chain)).cloned())
    }

    async fn store_latest_block(
        &self,
        chain: Chain,
        block_key: &str,
        mode: WatchMode,
    ) -> Result<(), WatcherError> {
        self.write_with(|doc| {
            doc.last_blocks
                .entry(mode)
                .or_default()
                .insert(chain, block_key.to_string());
        })
        .await?;
        debug!(%chain, %mode, block_key, "cursor saved");
        Ok(())
    }

    async fn store_vaas_by_block(
        &self,
        chain: Chain,
        vaas_by_block: &VaasByBlock,
    ) -> Result<(), WatcherError> {
        self.write_with(|doc| {
            merge_vaas_by_block(doc.vaas_by_block.entry(chain).or_default(), vaas_by_block);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("nttwatch-json-{name}-{}", std::process::id()));
        p.push("db.json");
        p
    }

    #[tokio::test]
    async fn survives_reopen() {
        let path = temp_path("reopen");
        let _ = tokio::fs::remove_file(&path).await;

        let store = JsonFileStorage::open(&path).await.unwrap();
        store
            .store_latest_block(Chain::Polygon, "20629146/2021-08-05T06:59:59.000Z", WatchMode::Vaa)
            .await
            .unwrap();
        let mut batch = VaasByBlock::new();
        batch.insert("20629146/2021-08-05T06:59:59.000Z".into(), vec!["0xabc:5/e/1".into()]);
        store.store_vaas_by_block(Chain::Polygon, &batch).await.unwrap();
        drop(store);

        let reopened = JsonFileStorage::open(&path).await.unwrap();
        assert_eq!(
            reopened
                .get_last_block_by_chain(Chain::Polygon, WatchMode::Vaa)
                .await
                .unwrap()
                .as_deref(),
            Some("20629146/2021-08-05T06:59:59.000Z")
        );
        assert_eq!(reopened.vaas_by_block(Chain::Polygon).await, batch);
        assert!(!path.with_extension("json.tmp").exists());

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let path = temp_path("missing");
        let _ = tokio::fs::remove_file(&path).await;
        let store = JsonFileStorage::open(&path).await.unwrap();
        assert!(store
            .get_last_block_by_chain(Chain::Solana, WatchMode::Ntt)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_storage_error() {
        let path = temp_path("corrupt");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"{ not json").await.unwrap();
        let err = JsonFileStorage::open(&path).await.err().unwrap();
        assert!(matches!(err, WatcherError::Storage(_)));
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn failed_temp_write_keeps_previous_state() {
        let path = temp_path("tmpfail");
        let _ = tokio::fs::remove_file(&path).await;
        let tmp = path.with_extension("json.tmp");
        let _ = tokio::fs::remove_dir(&tmp).await;

        let store = JsonFileStorage::open(&path).await.unwrap();
        store
            .store_latest_block(Chain::Base, "10/t", WatchMode::Vaa)
            .await
            .unwrap();
        let on_disk = tokio::fs::read(&path).await.unwrap();
        let doc: Document = serde_json::from_slice(&on_disk).unwrap();
        assert_eq!(doc.last_blocks[&WatchMode::Vaa][&Chain::Base], "10/t");

        // the temp file cannot be created while a directory holds its name
        tokio::fs::create_dir_all(&tmp).await.unwrap();
        let err = store
            .store_latest_block(Chain::Base, "11/t", WatchMode::Vaa)
            .await
            .unwrap_err();
        assert!(matches!(err, WatcherError::Storage(_)));
        assert_eq!(
            store
                .get_last_block_by_chain(Chain::Base, WatchMode::Vaa)
                .await
                .unwrap()
                .as_deref(),
            Some("10/t")
        );
        assert_eq!(tokio::fs::read(&path).await.unwrap(), on_disk);

        tokio::fs::remove_dir(&tmp).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;
    }
}
