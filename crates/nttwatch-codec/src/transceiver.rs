//! Transceiver-level framing of manager messages.

use std::fmt;

use crate::error::{bytes32, CodecError};
use crate::manager::NttManagerMessage;
use crate::payload::WirePayload;
use crate::reader::{write_length_prefixed, Reader};

/// The transceiver a message was framed by, identified by its 4-byte prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransceiverFormat {
    Wormhole,
}

impl TransceiverFormat {
    pub const ALL: &'static [TransceiverFormat] = &[TransceiverFormat::Wormhole];

    pub fn prefix(self) -> [u8; 4] {
        match self {
            Self::Wormhole => [0x99, 0x45, 0xff, 0x10],
        }
    }

    pub fn from_prefix(prefix: [u8; 4]) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.prefix() == prefix)
    }
}

impl fmt::Display for TransceiverFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wormhole => write!(f, "wormhole"),
        }
    }
}

/// A manager message wrapped for transport by a transceiver (wire format).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransceiverMessage<A> {
    pub format: TransceiverFormat,
    pub source_ntt_manager: [u8; 32],
    pub recipient_ntt_manager: [u8; 32],
    pub ntt_manager_payload: NttManagerMessage<A>,
    /// Transceiver-specific trailer, opaque to this crate.
    pub transceiver_payload: Vec<u8>,
}

impl<A> TransceiverMessage<A> {
    pub fn new(
        format: TransceiverFormat,
        source_ntt_manager: &[u8],
        recipient_ntt_manager: &[u8],
        ntt_manager_payload: NttManagerMessage<A>,
        transceiver_payload: Vec<u8>,
    ) -> Result<Self, CodecError> {
        Ok(Self {
            format,
            source_ntt_manager: bytes32("source_ntt_manager", source_ntt_manager)?,
            recipient_ntt_manager: bytes32("recipient_ntt_manager", recipient_ntt_manager)?,
            ntt_manager_payload,
            transceiver_payload,
        })
    }
}

impl<A: WirePayload> TransceiverMessage<A> {
    /// Decode, choosing the transceiver format from the prefix.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(data);
        let prefix = r.array::<4>("transceiver.prefix")?;
        let format = TransceiverFormat::from_prefix(prefix).ok_or_else(|| {
            CodecError::malformed(format!("unknown transceiver prefix {prefix:02x?}"))
        })?;
        Self::read_body(format, &mut r)
    }

    /// Decode, requiring the prefix of `format`.
    pub fn decode_as(format: TransceiverFormat, data: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(data);
        let prefix = r.array::<4>("transceiver.prefix")?;
        if prefix != format.prefix() {
            return Err(CodecError::malformed(format!(
                "expected {format} transceiver prefix, got {prefix:02x?}"
            )));
        }
        Self::read_body(format, &mut r)
    }

    fn read_body(format: TransceiverFormat, r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let source_ntt_manager = r.array("transceiver.source_ntt_manager")?;
        let recipient_ntt_manager = r.array("transceiver.recipient_ntt_manager")?;
        let inner = r.length_prefixed("transceiver.ntt_manager_payload")?;
        let ntt_manager_payload = NttManagerMessage::read_wire(&mut Reader::new(inner))?;
        let transceiver_payload = r.length_prefixed("transceiver.payload")?.to_vec();
        Ok(Self {
            format,
            source_ntt_manager,
            recipient_ntt_manager,
            ntt_manager_payload,
            transceiver_payload,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let inner = self.ntt_manager_payload.encode_wire()?;
        let mut buf = Vec::with_capacity(4 + 64 + 4 + inner.len() + self.transceiver_payload.len());
        buf.extend_from_slice(&self.format.prefix());
        buf.extend_from_slice(&self.source_ntt_manager);
        buf.extend_from_slice(&self.recipient_ntt_manager);
        write_length_prefixed(&mut buf, "transceiver.ntt_manager_payload", &inner)?;
        write_length_prefixed(&mut buf, "transceiver.payload", &self.transceiver_payload)?;
        Ok(buf)
    }
}
