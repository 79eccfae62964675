//! `OutboxItem`: a pending outbound transfer held by the Solana NTT program.

use crate::amount::TrimmedAmount;
use crate::error::CodecError;
use crate::reader::Reader;
use crate::validated::DISCRIMINATOR_LEN;

/// An outbound transfer awaiting release.
///
/// Items are never deleted; the only state change is `released` flipping to
/// `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxItem {
    pub amount: TrimmedAmount,
    pub sender: [u8; 32],
    pub recipient_chain: u16,
    pub recipient_ntt_manager: [u8; 32],
    pub recipient_address: [u8; 32],
    /// Unix seconds after which the transfer may be released.
    pub release_timestamp: i64,
    pub released: bool,
}

impl OutboxItem {
    /// discriminator + amount + sender + chain + manager + address + timestamp + bitmap
    pub const ACCOUNT_LEN: usize = DISCRIMINATOR_LEN + TrimmedAmount::LEN + 32 + 2 + 32 + 32 + 8 + 16;

    pub fn decode_account(data: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(data);
        r.skip(DISCRIMINATOR_LEN, "discriminator")?;
        let amount = TrimmedAmount::read_account(&mut r)?;
        let sender = r.array("outbox.sender")?;
        let recipient_chain = r.u16_le("outbox.recipient_chain")?;
        let recipient_ntt_manager = r.array("outbox.recipient_ntt_manager")?;
        let recipient_address = r.array("outbox.recipient_address")?;
        let release_timestamp = r.i64_le("outbox.release_timestamp")?;
        let released = r.u128_le("outbox.released")? != 0;
        Ok(Self {
            amount,
            sender,
            recipient_chain,
            recipient_ntt_manager,
            recipient_address,
            release_timestamp,
            released,
        })
    }

    /// Mark the item released. Returns `false` if it already was.
    pub fn release(&mut self) -> bool {
        !std::mem::replace(&mut self.released, true)
    }

    /// Not yet released and past its release timestamp.
    pub fn is_releasable(&self, now: i64) -> bool {
        !self.released && now >= self.release_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(released_bitmap: u128) -> Vec<u8> {
        let mut data = vec![0u8; DISCRIMINATOR_LEN];
        data.extend_from_slice(&500u64.to_le_bytes());
        data.push(6);
        data.extend_from_slice(&[0xaa; 32]);
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&[0xbb; 32]);
        data.extend_from_slice(&[0xcc; 32]);
        data.extend_from_slice(&1_700_000_000i64.to_le_bytes());
        data.extend_from_slice(&released_bitmap.to_le_bytes());
        data
    }

    #[test]
    fn decodes_pending_item() {
        let data = account(0);
        assert_eq!(data.len(), OutboxItem::ACCOUNT_LEN);
        let item = OutboxItem::decode_account(&data).unwrap();
        assert_eq!(item.amount, TrimmedAmount::new(500, 6));
        assert_eq!(item.sender, [0xaa; 32]);
        assert_eq!(item.recipient_chain, 2);
        assert_eq!(item.recipient_ntt_manager, [0xbb; 32]);
        assert_eq!(item.recipient_address, [0xcc; 32]);
        assert_eq!(item.release_timestamp, 1_700_000_000);
        assert!(!item.released);
    }

    #[test]
    fn any_bitmap_bit_means_released() {
        let item = OutboxItem::decode_account(&account(1 << 3)).unwrap();
        assert!(item.released);
    }

    #[test]
    fn release_flips_once() {
        let mut item = OutboxItem::decode_account(&account(0)).unwrap();
        assert!(!item.is_releasable(1_699_999_999));
        assert!(item.is_releasable(1_700_000_000));
        assert!(item.release());
        assert!(!item.release());
        assert!(!item.is_releasable(1_800_000_000));
    }

    #[test]
    fn truncated_account_is_malformed() {
        let data = account(0);
        assert!(OutboxItem::decode_account(&data[..data.len() - 1]).unwrap_err().is_malformed());
    }
}
