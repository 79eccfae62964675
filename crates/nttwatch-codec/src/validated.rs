//! `ValidatedTransceiverMessage`: the account the Solana NTT program writes
//! once a transceiver message has been verified.

use crate::error::{bytes32, CodecError};
use crate::manager::NttManagerMessage;
use crate::payload::AccountPayload;
use crate::reader::Reader;

/// Length of the leading account discriminator.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Bytes before the inner manager message.
pub const HEADER_LEN: usize = DISCRIMINATOR_LEN + 2 + 32 + 32;

/// Account layout:
///
/// ```text
/// [8 discriminator][u16 LE chain][32 source manager][32 recipient manager][manager message (account) ..]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransceiverMessage<A> {
    pub from_chain: u16,
    pub source_ntt_manager: [u8; 32],
    pub recipient_ntt_manager: [u8; 32],
    pub ntt_manager_payload: NttManagerMessage<A>,
}

impl<A> ValidatedTransceiverMessage<A> {
    pub fn new(
        from_chain: u16,
        source_ntt_manager: &[u8],
        recipient_ntt_manager: &[u8],
        ntt_manager_payload: NttManagerMessage<A>,
    ) -> Result<Self, CodecError> {
        Ok(Self {
            from_chain,
            source_ntt_manager: bytes32("source_ntt_manager", source_ntt_manager)?,
            recipient_ntt_manager: bytes32("recipient_ntt_manager", recipient_ntt_manager)?,
            ntt_manager_payload,
        })
    }
}

impl<A: AccountPayload> ValidatedTransceiverMessage<A> {
    /// Decode an account, surfacing the failure reason.
    pub fn try_decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(data);
        r.skip(DISCRIMINATOR_LEN, "discriminator")?;
        let from_chain = r.u16_le("from_chain")?;
        let source_ntt_manager = r.array("source_ntt_manager")?;
        let recipient_ntt_manager = r.array("recipient_ntt_manager")?;
        let ntt_manager_payload = NttManagerMessage::decode_account(r.rest())?;
        Ok(Self {
            from_chain,
            source_ntt_manager,
            recipient_ntt_manager,
            ntt_manager_payload,
        })
    }

    /// Decode an account, logging and returning `None` on malformed data.
    pub fn deserialize(data: &[u8]) -> Option<Self> {
        match Self::try_decode(data) {
            Ok(msg) => Some(msg),
            Err(e) => {
                tracing::warn!(len = data.len(), error = %e, "skipping undecodable transceiver message account");
                None
            }
        }
    }
}
