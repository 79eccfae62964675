//! `NativeTokenTransfer`: the token-transfer payload of an NTT manager message.

use crate::amount::TrimmedAmount;
use crate::error::{bytes32, CodecError};
use crate::payload::{AccountPayload, WirePayload};
use crate::reader::Reader;

/// A cross-chain token transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTokenTransfer {
    pub trimmed_amount: TrimmedAmount,
    pub source_token: [u8; 32],
    pub recipient_address: [u8; 32],
    pub recipient_chain: u16,
}

impl NativeTokenTransfer {
    /// Wire prefix, `"\x99NTT"`.
    pub const PREFIX: [u8; 4] = [0x99, 0x4e, 0x54, 0x54];
    /// prefix + amount + token + recipient + chain
    pub const WIRE_LEN: usize = 4 + TrimmedAmount::LEN + 32 + 32 + 2;
    /// amount + token + chain + recipient
    pub const ACCOUNT_LEN: usize = TrimmedAmount::LEN + 32 + 2 + 32;

    pub fn new(
        trimmed_amount: TrimmedAmount,
        source_token: &[u8],
        recipient_address: &[u8],
        recipient_chain: u16,
    ) -> Result<Self, CodecError> {
        Ok(Self {
            trimmed_amount,
            source_token: bytes32("source_token", source_token)?,
            recipient_address: bytes32("recipient_address", recipient_address)?,
            recipient_chain,
        })
    }
}

impl WirePayload for NativeTokenTransfer {
    fn decode_wire(data: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(data);
        let prefix = r.array::<4>("ntt.prefix")?;
        if prefix != Self::PREFIX {
            return Err(CodecError::malformed(format!(
                "unexpected NativeTokenTransfer prefix {prefix:02x?}"
            )));
        }
        let trimmed_amount = TrimmedAmount::read_wire(&mut r)?;
        let source_token = r.array("ntt.source_token")?;
        let recipient_address = r.array("ntt.recipient_address")?;
        let recipient_chain = r.u16_be("ntt.recipient_chain")?;
        Ok(Self {
            trimmed_amount,
            source_token,
            recipient_address,
            recipient_chain,
        })
    }

    fn encode_wire(&self) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::with_capacity(Self::WIRE_LEN);
        buf.extend_from_slice(&Self::PREFIX);
        self.trimmed_amount.write_wire(&mut buf);
        buf.extend_from_slice(&self.source_token);
        buf.extend_from_slice(&self.recipient_address);
        buf.extend_from_slice(&self.recipient_chain.to_be_bytes());
        Ok(buf)
    }
}

impl AccountPayload for NativeTokenTransfer {
    fn decode_account(data: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(data);
        let trimmed_amount = TrimmedAmount::read_account(&mut r)?;
        let source_token = r.array("ntt.source_token")?;
        let recipient_chain = r.u16_le("ntt.recipient_chain")?;
        let recipient_address = r.array("ntt.recipient_address")?;
        Ok(Self {
            trimmed_amount,
            source_token,
            recipient_address,
            recipient_chain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NativeTokenTransfer {
        NativeTokenTransfer::new(TrimmedAmount::new(1_000_000, 8), &[0x1d; 32], &[0x49; 32], 1)
            .unwrap()
    }

    #[test]
    fn wire_layout() {
        let bytes = sample().encode_wire().unwrap();
        assert_eq!(bytes.len(), NativeTokenTransfer::WIRE_LEN);
        assert_eq!(&bytes[..4], &NativeTokenTransfer::PREFIX);
        assert_eq!(bytes[4], 8);
        assert_eq!(&bytes[77..], &[0, 1]);
        assert_eq!(NativeTokenTransfer::decode_wire(&bytes).unwrap(), sample());
    }

    #[test]
    fn wrong_prefix_is_malformed() {
        let mut bytes = sample().encode_wire().unwrap();
        bytes[1] = 0x00;
        assert!(NativeTokenTransfer::decode_wire(&bytes).unwrap_err().is_malformed());
    }

    #[test]
    fn truncated_wire_is_malformed() {
        let bytes = sample().encode_wire().unwrap();
        let err = NativeTokenTransfer::decode_wire(&bytes[..70]).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn account_layout() {
        let mut data = Vec::new();
        data.extend_from_slice(&1_000_000u64.to_le_bytes());
        data.push(8);
        data.extend_from_slice(&[0x1d; 32]);
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&[0x49; 32]);
        assert_eq!(data.len(), NativeTokenTransfer::ACCOUNT_LEN);
        // trailing bytes belong to the enclosing account and are ignored
        data.extend_from_slice(&[0u8; 16]);
        assert_eq!(NativeTokenTransfer::decode_account(&data).unwrap(), sample());
    }

    #[test]
    fn new_rejects_short_ids() {
        let err = NativeTokenTransfer::new(TrimmedAmount::new(1, 8), &[0u8; 20], &[0u8; 32], 2)
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { field: "source_token", .. }));
    }
}
