//! Key encoding: fixed-width, order-preserving string keys.
//!
//! Message ids are laid out for a store that sorts keys byte-for-byte:
//!
//! ```text
//! chain/MAX_UINT64-block/emitter/sequence
//! 00002/00000000000013140651/0000000000000000000000008ea8874192c8c715e620845f833f48f39b24e222/00000000000000000000
//! ```
//!
//! The block number is stored as its complement against `u64::MAX`, so a
//! forward scan of one chain's keys yields the most recent block first.
//! Every numeric field is zero-padded to a fixed width so lexicographic and
//! numeric order coincide.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::error::WatcherError;

/// `2^64 - 1`, the value block numbers are complemented against.
pub const MAX_UINT64: u64 = u64::MAX;

/// Separator used by every composite key.
pub const KEY_SEPARATOR: char = '/';

/// Zero-pad a 16-bit value to 5 decimal digits.
pub fn pad_uint16(value: u16) -> String {
    format!("{value:05}")
}

/// Zero-pad a 64-bit value to 20 decimal digits.
pub fn pad_uint64(value: u64) -> String {
    format!("{value:020}")
}

// ─── Message ids ─────────────────────────────────────────────────────────────

/// The decoded parts of a message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageId {
    pub chain: u16,
    pub block: u64,
    pub emitter: String,
    pub sequence: u64,
}

/// Build the row key for a message observed at `block`.
pub fn make_message_id(chain_id: u16, block: u64, emitter: &str, sequence: u64) -> String {
    format!(
        "{}/{}/{}/{}",
        pad_uint16(chain_id),
        pad_uint64(MAX_UINT64 - block),
        emitter,
        pad_uint64(sequence)
    )
}

/// Inverse of [`make_message_id`].
pub fn parse_message_id(id: &str) -> Result<MessageId, WatcherError> {
    // the emitter may itself contain '/', so it is everything between the
    // second separator and the last one
    let mut head = id.splitn(3, KEY_SEPARATOR);
    let (Some(chain), Some(inverse_block), Some(rest)) = (head.next(), head.next(), head.next())
    else {
        return Err(WatcherError::invalid_key(id, "expected 4 '/'-separated fields"));
    };
    let Some((emitter, sequence)) = rest.rsplit_once(KEY_SEPARATOR) else {
        return Err(WatcherError::invalid_key(id, "expected 4 '/'-separated fields"));
    };
    let chain: u16 = chain
        .parse()
        .map_err(|_| WatcherError::invalid_key(id, "chain is not a u16"))?;
    let inverse_block: u64 = inverse_block
        .parse()
        .map_err(|_| WatcherError::invalid_key(id, "block is not a u64"))?;
    let sequence: u64 = sequence
        .parse()
        .map_err(|_| WatcherError::invalid_key(id, "sequence is not a u64"))?;
    Ok(MessageId {
        chain,
        block: MAX_UINT64 - inverse_block,
        emitter: emitter.to_string(),
        sequence,
    })
}

// ─── Block keys ──────────────────────────────────────────────────────────────

/// `"<block>/<timestamp>"`.
pub fn make_block_key(block: u64, timestamp: &str) -> String {
    format!("{block}{KEY_SEPARATOR}{timestamp}")
}

/// Block key with an ISO-8601 UTC timestamp at millisecond precision
/// (`2024-03-14T02:25:55.000Z`).
pub fn block_key_at(block: u64, timestamp: DateTime<Utc>) -> String {
    make_block_key(block, &timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// The block number a block key was built from.
pub fn extract_block_from_key(key: &str) -> Result<u64, WatcherError> {
    let prefix = key.split(KEY_SEPARATOR).next().unwrap_or_default();
    prefix
        .parse()
        .map_err(|_| WatcherError::invalid_key(key, "block prefix is not a u64"))
}

// ─── VAA keys and row keys ───────────────────────────────────────────────────

/// The decoded parts of a VAA key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaaKey {
    pub tx_hash: String,
    pub chain: u16,
    pub emitter: String,
    pub sequence: u64,
}

/// `"<txHash>:<chainId>/<emitter>/<sequence>"`.
pub fn make_vaa_key(tx_hash: &str, chain: Chain, emitter: &str, sequence: u64) -> String {
    format!("{tx_hash}:{}/{emitter}/{sequence}", chain.id())
}

/// Inverse of [`make_vaa_key`].
///
/// Only the exact form `make_vaa_key` writes is accepted: chain and sequence
/// are plain decimals without leading zeros. An NTT message key, whose last
/// field is a 64-character hex id, never parses as a VAA key even when that
/// id happens to be all digits.
pub fn parse_vaa_key(key: &str) -> Result<VaaKey, WatcherError> {
    let (tx_hash, rest) = key
        .rsplit_once(':')
        .ok_or_else(|| WatcherError::invalid_key(key, "missing ':' after tx hash"))?;
    let parts: Vec<&str> = rest.split(KEY_SEPARATOR).collect();
    let [chain, emitter, sequence] = parts.as_slice() else {
        return Err(WatcherError::invalid_key(key, "expected chain/emitter/sequence"));
    };
    Ok(VaaKey {
        tx_hash: tx_hash.to_string(),
        chain: canonical_decimal(chain)
            .ok_or_else(|| WatcherError::invalid_key(key, "chain is not a u16"))?,
        emitter: emitter.to_string(),
        sequence: canonical_decimal(sequence)
            .ok_or_else(|| WatcherError::invalid_key(key, "sequence is not a u64"))?,
    })
}

/// Parse an unpadded decimal; `"007"` and `"+7"` are rejected.
fn canonical_decimal<T>(field: &str) -> Option<T>
where
    T: std::str::FromStr + ToString,
{
    let value: T = field.parse().ok()?;
    (value.to_string() == field).then_some(value)
}

/// Row key for the by-transaction-hash index: `"<txHash>/<chain>"`.
pub fn make_vaas_by_tx_hash_row_key(tx_hash: &str, chain: u16) -> String {
    format!("{tx_hash}/{}", pad_uint16(chain))
}

/// Row key for the signed-VAA index: `"<chain>/<emitter>/<sequence>"`.
pub fn make_signed_vaas_row_key(chain: u16, emitter: &str, sequence: u64) -> String {
    format!("{}/{emitter}/{}", pad_uint16(chain), pad_uint64(sequence))
}

/// Identifier for a decoded NTT transceiver message:
/// `"<txHash>:<chainId>/<hex source manager>/<hex message id>"`.
pub fn make_ntt_message_key(
    tx_hash: &str,
    chain: u16,
    source_manager: &[u8; 32],
    message_id: &[u8; 32],
) -> String {
    format!(
        "{tx_hash}:{chain}/{}/{}",
        hex::encode(source_manager),
        hex::encode(message_id)
    )
}

// ─── Tests ────────────────────────────────────────────────────────────────────
