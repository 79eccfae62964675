//! nttwatch-codec — encode/decode of the Native Token Transfer message family.
//!
//! Two independent encodings exist for most entities and must not be mixed:
//!
//! - **wire format**: the platform-neutral, big-endian format carried in
//!   cross-chain messages. Length-prefixed fields use a 2-byte BE length.
//! - **account format**: the Borsh-style, little-endian layout the Solana
//!   program stores in its accounts. Decode-only; no outer prefix, and the
//!   manager payload runs to the end of the buffer.
//!
//! ```text
//! TransceiverMessage (wire)
//! ├── prefix              [4]   99 45 ff 10 (Wormhole transceiver)
//! ├── source manager      [32]
//! ├── recipient manager   [32]
//! ├── NttManagerMessage   [u16 BE len][..]
//! │   ├── id              [32]
//! │   ├── sender          [32]
//! │   └── payload         [u16 BE len][..]  e.g. NativeTokenTransfer
//! └── transceiver payload [u16 BE len][..]
//! ```

pub mod amount;
pub mod error;
pub mod manager;
pub mod outbox;
pub mod payload;
pub mod reader;
pub mod transceiver;
pub mod transfer;
pub mod validated;

pub use amount::TrimmedAmount;
pub use error::CodecError;
pub use manager::NttManagerMessage;
pub use outbox::OutboxItem;
pub use payload::{AccountPayload, WirePayload};
pub use transceiver::{TransceiverFormat, TransceiverMessage};
pub use transfer::NativeTokenTransfer;
pub use validated::ValidatedTransceiverMessage;

/// Decode a Solana NTT transceiver-message account carrying a token transfer.
///
/// Returns `None` (after logging) on malformed data, so a bad account never
/// aborts the surrounding batch.
pub fn decode_transfer_account(
    data: &[u8],
) -> Option<ValidatedTransceiverMessage<NativeTokenTransfer>> {
    ValidatedTransceiverMessage::deserialize(data)
}
