//! Turn raw chain data into stored message identifiers.
//!
//! Decoding is per message: a payload that fails to decode is logged and
//! counted, and the rest of the block is still processed.

use nttwatch_codec::{NativeTokenTransfer, TransceiverMessage, ValidatedTransceiverMessage};
use nttwatch_core::keys::{block_key_at, make_ntt_message_key, make_vaa_key};
use nttwatch_core::{Chain, WatchMode};
use tracing::warn;

use crate::client::{RawBlock, RawMessage, RawTransaction};

/// Identifiers found in one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBlock {
    pub block_key: String,
    pub ids: Vec<String>,
    /// Payloads that could not be decoded.
    pub skipped: usize,
}

/// Identifiers for the messages in `tx` that `mode` follows, plus the
/// number of undecodable payloads.
pub fn transaction_message_ids(chain: Chain, mode: WatchMode, tx: &RawTransaction) -> (Vec<String>, usize) {
    let mut ids = Vec::new();
    let mut skipped = 0;
    for message in &tx.messages {
        match (mode, message) {
            (WatchMode::Vaa, RawMessage::Vaa { emitter, sequence }) => {
                ids.push(make_vaa_key(&tx.hash, chain, emitter, *sequence));
            }
            (WatchMode::Ntt, RawMessage::NttWire(bytes)) => {
                match TransceiverMessage::<NativeTokenTransfer>::decode(bytes) {
                    Ok(msg) => ids.push(make_ntt_message_key(
                        &tx.hash,
                        chain.id(),
                        &msg.source_ntt_manager,
                        &msg.ntt_manager_payload.id,
                    )),
                    Err(e) => {
                        warn!(%chain, tx = %tx.hash, error = %e, "skipping undecodable transceiver message");
                        skipped += 1;
                    }
                }
            }
            (WatchMode::Ntt, RawMessage::NttAccount(bytes)) => {
                match ValidatedTransceiverMessage::<NativeTokenTransfer>::deserialize(bytes) {
                    Some(msg) => ids.push(make_ntt_message_key(
                        &tx.hash,
                        msg.from_chain,
                        &msg.source_ntt_manager,
                        &msg.ntt_manager_payload.id,
                    )),
                    None => skipped += 1,
                }
            }
            _ => {}
        }
    }
    (ids, skipped)
}

/// Decode every transaction in `block`.
pub fn decode_block(chain: Chain, mode: WatchMode, block: &RawBlock) -> DecodedBlock {
    let mut ids = Vec::new();
    let mut skipped = 0;
    for tx in &block.transactions {
        let (tx_ids, tx_skipped) = transaction_message_ids(chain, mode, tx);
        ids.extend(tx_ids);
        skipped += tx_skipped;
    }
    DecodedBlock {
        block_key: block_key_at(block.number, block.timestamp),
        ids,
        skipped,
    }
}
