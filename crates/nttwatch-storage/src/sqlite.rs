//! SQLite storage backend for NttWatch.
//!
//! Persists cursors and observed messages to a single SQLite file using
//! `sqlx` in WAL mode.
//!
//! # Usage
//! ```rust,no_run
//! use nttwatch_storage::sqlite::SqliteStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // File-backed (persistent)
//! let store = SqliteStorage::open("./nttwatch.db").await?;
//!
//! // In-memory (tests / ephemeral)
//! let store = SqliteStorage::in_memory().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use nttwatch_core::keys::{extract_block_from_key, make_message_id, parse_vaa_key};
use nttwatch_core::{Chain, StorageAdapter, VaasByBlock, WatchMode, WatcherError};

fn storage_err(e: sqlx::Error) -> WatcherError {
    WatcherError::Storage(e.to_string())
}

/// SQLite-backed storage for cursors and observed messages.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (or create) a SQLite database at `path`.
    ///
    /// The path may be a plain file path (`"./nttwatch.db"`) or a full
    /// SQLite URL (`"sqlite:./nttwatch.db?mode=rwc"`).
    pub async fn open(path: &str) -> Result<Self, WatcherError> {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let pool = SqlitePool::connect(&url).await.map_err(storage_err)?;
        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Open an in-memory SQLite database.
    ///
    /// All data is lost when the pool is dropped. A single connection keeps
    /// every query on the same database.
    pub async fn in_memory() -> Result<Self, WatcherError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_err)?;
        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<(), WatcherError> {
        sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS last_blocks (
                chain_id  INTEGER NOT NULL,
                mode      TEXT    NOT NULL,
                block_key TEXT    NOT NULL,
                PRIMARY KEY (chain_id, mode)
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS vaas_by_block (
                chain_id   INTEGER NOT NULL,
                block_key  TEXT    NOT NULL,
                entry      TEXT    NOT NULL,
                position   INTEGER NOT NULL,
                message_id TEXT,
                PRIMARY KEY (chain_id, block_key, entry)
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        // message ids sort newest block first within a chain
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_vaas_message_id ON vaas_by_block (message_id);",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    /// Everything stored for `chain`, entries in insertion order.
    pub async fn vaas_by_block(&self, chain: Chain) -> Result<VaasByBlock, WatcherError> {
        let rows = sqlx::query(
            "SELECT block_key, entry FROM vaas_by_block
             WHERE chain_id = ? ORDER BY block_key, position",
        )
        .bind(chain.id() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let mut out = VaasByBlock::new();
        for row in rows {
            out.entry(row.get::<String, _>("block_key"))
                .or_default()
                .push(row.get::<String, _>("entry"));
        }
        Ok(out)
    }

    /// The `limit` most recent message ids for `chain`, newest block first.
    pub async fn latest_message_ids(
        &self,
        chain: Chain,
        limit: u32,
    ) -> Result<Vec<String>, WatcherError> {
        let rows = sqlx::query(
            "SELECT message_id FROM vaas_by_block
             WHERE chain_id = ? AND message_id IS NOT NULL
             ORDER BY message_id LIMIT ?",
        )
        .bind(chain.id() as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows.into_iter().map(|r| r.get::<String, _>("message_id")).collect())
    }
}

// ─── StorageAdapter impl ─────────────────────────────────────────────────────

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn get_last_block_by_chain(
        &self,
        chain: Chain,
        mode: WatchMode,
    ) -> Result<Option<String>, WatcherError> {
        let row = sqlx::query(
            "SELECT block_key FROM last_blocks WHERE chain_id = ? AND mode = ?",
        )
        .bind(chain.id() as i64)
        .bind(mode.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.map(|r| r.get::<String, _>("block_key")))
    }

    async fn store_latest_block(
        &self,
        chain: Chain,
        block_key: &str,
        mode: WatchMode,
    ) -> Result<(), WatcherError> {
        sqlx::query(
            "INSERT OR REPLACE INTO last_blocks (chain_id, mode, block_key) VALUES (?, ?, ?)",
        )
        .bind(chain.id() as i64)
        .bind(mode.to_string())
        .bind(block_key)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        debug!(%chain, %mode, block_key, "cursor saved");
        Ok(())
    }

    async fn store_vaas_by_block(
        &self,
        chain: Chain,
        vaas_by_block: &VaasByBlock,
    ) -> Result<(), WatcherError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        for (block_key, entries) in vaas_by_block {
            let block = extract_block_from_key(block_key)?;
            let next: i64 = sqlx::query(
                "SELECT COALESCE(MAX(position) + 1, 0) AS next FROM vaas_by_block
                 WHERE chain_id = ? AND block_key = ?",
            )
            .bind(chain.id() as i64)
            .bind(block_key)
            .fetch_one(&mut *tx)
            .await
            .map_err(storage_err)?
            .get("next");
            for (offset, entry) in entries.iter().enumerate() {
                let message_id = parse_vaa_key(entry)
                    .ok()
                    .map(|k| make_message_id(k.chain, block, &k.emitter, k.sequence));
                sqlx::query(
                    "INSERT OR IGNORE INTO vaas_by_block
                     (chain_id, block_key, entry, position, message_id)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(chain.id() as i64)
                .bind(block_key)
                .bind(entry)
                .bind(next + offset as i64)
                .bind(message_id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
            }
        }
        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use nttwatch_core::keys::make_ntt_message_key;

    const EMITTER: &str = "0000000000000000000000008ea8874192c8c715e620845f833f48f39b24e222";

    fn batch(block: u64, entries: &[String]) -> VaasByBlock {
        let mut v = VaasByBlock::new();
        v.insert(format!("{block}/2024-01-01T00:00:00.000Z"), entries.to_vec());
        v
    }

    fn vaa(tx: &str, seq: u64) -> String {
        format!("{tx}:2/{EMITTER}/{seq}")
    }

    #[tokio::test]
    async fn cursor_upsert() {
        let store = SqliteStorage::in_memory().await.unwrap();
        store
            .store_latest_block(Chain::Ethereum, "100/a", WatchMode::Vaa)
            .await
            .unwrap();
        store
            .store_latest_block(Chain::Ethereum, "200/b", WatchMode::Vaa)
            .await
            .unwrap();

        let loaded = store
            .get_last_block_by_chain(Chain::Ethereum, WatchMode::Vaa)
            .await
            .unwrap();
        assert_eq!(loaded.as_deref(), Some("200/b"));
        assert!(store
            .get_last_block_by_chain(Chain::Ethereum, WatchMode::Ntt)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_entries_ignored() {
        let store = SqliteStorage::in_memory().await.unwrap();
        let b = batch(10, &[vaa("0x01", 1), vaa("0x02", 2)]);
        store.store_vaas_by_block(Chain::Ethereum, &b).await.unwrap();
        store.store_vaas_by_block(Chain::Ethereum, &b).await.unwrap();

        let stored = store.vaas_by_block(Chain::Ethereum).await.unwrap();
        assert_eq!(stored, b);
    }

    #[tokio::test]
    async fn merge_appends_after_existing_entries() {
        let store = SqliteStorage::in_memory().await.unwrap();
        store
            .store_vaas_by_block(Chain::Ethereum, &batch(10, &[vaa("0x01", 1), vaa("0x02", 2)]))
            .await
            .unwrap();
        store
            .store_vaas_by_block(Chain::Ethereum, &batch(10, &[vaa("0x02", 2), vaa("0x03", 3)]))
            .await
            .unwrap();

        let stored = store.vaas_by_block(Chain::Ethereum).await.unwrap();
        assert_eq!(
            stored["10/2024-01-01T00:00:00.000Z"],
            vec![vaa("0x01", 1), vaa("0x02", 2), vaa("0x03", 3)]
        );
    }

    #[tokio::test]
    async fn latest_message_ids_newest_first() {
        let store = SqliteStorage::in_memory().await.unwrap();
        store
            .store_vaas_by_block(Chain::Ethereum, &batch(10, &[vaa("0x0a", 1)]))
            .await
            .unwrap();
        store
            .store_vaas_by_block(Chain::Ethereum, &batch(30, &[vaa("0x1e", 3)]))
            .await
            .unwrap();
        store
            .store_vaas_by_block(Chain::Ethereum, &batch(20, &[vaa("0x14", 2)]))
            .await
            .unwrap();

        let ids = store.latest_message_ids(Chain::Ethereum, 2).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], make_message_id(2, 30, EMITTER, 3));
        assert_eq!(ids[1], make_message_id(2, 20, EMITTER, 2));
    }

    #[tokio::test]
    async fn ntt_entries_have_no_message_id() {
        let store = SqliteStorage::in_memory().await.unwrap();
        let ntt = format!("0xsig:1/{}/{}", "ab".repeat(32), "cd".repeat(32));
        store
            .store_vaas_by_block(Chain::Solana, &batch(5, &[ntt.clone()]))
            .await
            .unwrap();
        assert!(store.latest_message_ids(Chain::Solana, 10).await.unwrap().is_empty());
        assert_eq!(store.vaas_by_block(Chain::Solana).await.unwrap()["5/2024-01-01T00:00:00.000Z"], vec![ntt]);
    }

    #[tokio::test]
    async fn ntt_entries_with_numeric_ids_have_no_message_id() {
        let store = SqliteStorage::in_memory().await.unwrap();
        let mut manager = [0u8; 32];
        manager[12..].copy_from_slice(&[0xb2; 20]);
        let mut id = [0u8; 32];
        id[31] = 8;
        let ntt = make_ntt_message_key("sig", 10002, &manager, &id);
        store
            .store_vaas_by_block(Chain::Solana, &batch(7, &[ntt.clone(), vaa("0xtx", 3)]))
            .await
            .unwrap();
        let ids = store.latest_message_ids(Chain::Solana, 10).await.unwrap();
        assert_eq!(ids, vec![make_message_id(2, 7, EMITTER, 3)]);
        assert_eq!(
            store.vaas_by_block(Chain::Solana).await.unwrap()["7/2024-01-01T00:00:00.000Z"],
            vec![ntt, vaa("0xtx", 3)]
        );
    }
}
