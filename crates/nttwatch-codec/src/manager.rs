//! `NttManagerMessage`: the manager-level envelope around a typed payload.

use crate::error::{bytes32, CodecError};
use crate::payload::{AccountPayload, WirePayload};
use crate::reader::{write_length_prefixed, Reader};

/// Message emitted by an NTT manager.
///
/// Wire format: `[32 id][32 sender][u16 BE len][payload]`.
/// Account format: `[32 id][32 sender][payload to end of buffer]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NttManagerMessage<A> {
    /// Manager-assigned sequence, left-padded to 32 bytes.
    pub id: [u8; 32],
    pub sender: [u8; 32],
    pub payload: A,
}

impl<A> NttManagerMessage<A> {
    pub fn new(id: &[u8], sender: &[u8], payload: A) -> Result<Self, CodecError> {
        Ok(Self {
            id: bytes32("id", id)?,
            sender: bytes32("sender", sender)?,
            payload,
        })
    }
}

impl<A: WirePayload> NttManagerMessage<A> {
    pub fn decode_wire(data: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(data);
        Self::read_wire(&mut r)
    }

    pub(crate) fn read_wire(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let id = r.array("manager.id")?;
        let sender = r.array("manager.sender")?;
        let payload = A::decode_wire(r.length_prefixed("manager.payload")?)?;
        Ok(Self { id, sender, payload })
    }

    pub fn encode_wire(&self) -> Result<Vec<u8>, CodecError> {
        let payload = self.payload.encode_wire()?;
        let mut buf = Vec::with_capacity(64 + 2 + payload.len());
        buf.extend_from_slice(&self.id);
        buf.extend_from_slice(&self.sender);
        write_length_prefixed(&mut buf, "manager.payload", &payload)?;
        Ok(buf)
    }
}

impl<A: AccountPayload> NttManagerMessage<A> {
    pub fn decode_account(data: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(data);
        let id = r.array("manager.id")?;
        let sender = r.array("manager.sender")?;
        let payload = A::decode_account(r.rest())?;
        Ok(Self { id, sender, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_length_prefix_is_big_endian() {
        let msg = NttManagerMessage::new(&[1u8; 32], &[2u8; 32], vec![0xaa; 258]).unwrap();
        let bytes = msg.encode_wire().unwrap();
        assert_eq!(&bytes[64..66], &[0x01, 0x02]);
        assert_eq!(bytes.len(), 64 + 2 + 258);
        assert_eq!(NttManagerMessage::<Vec<u8>>::decode_wire(&bytes).unwrap(), msg);
    }

    #[test]
    fn account_payload_runs_to_end() {
        let mut data = vec![1u8; 32];
        data.extend_from_slice(&[2u8; 32]);
        data.extend_from_slice(&[7, 8, 9]);
        let msg = NttManagerMessage::<Vec<u8>>::decode_account(&data).unwrap();
        assert_eq!(msg.id, [1u8; 32]);
        assert_eq!(msg.sender, [2u8; 32]);
        assert_eq!(msg.payload, vec![7, 8, 9]);
    }

    #[test]
    fn declared_length_past_end_is_malformed() {
        let mut data = vec![0u8; 64];
        data.extend_from_slice(&[0x00, 0x10, 1, 2, 3]);
        let err = NttManagerMessage::<Vec<u8>>::decode_wire(&data).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn oversize_payload_rejected_on_encode() {
        let msg = NttManagerMessage::new(&[0u8; 32], &[0u8; 32], vec![0u8; 70_000]).unwrap();
        assert!(matches!(
            msg.encode_wire().unwrap_err(),
            CodecError::InvalidField { field: "manager.payload", .. }
        ));
    }

    #[test]
    fn new_requires_32_byte_ids() {
        let err = NttManagerMessage::new(&[0u8; 31], &[0u8; 32], ()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { field: "id", .. }));
    }
}
