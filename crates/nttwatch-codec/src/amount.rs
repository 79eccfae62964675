//! Trimmed token amounts.

use crate::error::CodecError;
use crate::reader::Reader;

/// A token amount truncated to at most 8 decimals for cross-chain transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrimmedAmount {
    pub amount: u64,
    pub decimals: u8,
}

impl TrimmedAmount {
    /// Encoded size in either format.
    pub const LEN: usize = 9;

    pub fn new(amount: u64, decimals: u8) -> Self {
        Self { amount, decimals }
    }

    /// Rescale to `target` decimals.
    ///
    /// Reducing precision truncates (integer division); increasing it is
    /// exact. Returns `None` only if the scaled value overflows `u128`.
    pub fn normalize(&self, target: u8) -> Option<u128> {
        let amount = self.amount as u128;
        if amount == 0 || self.decimals == target {
            return Some(amount);
        }
        if self.decimals > target {
            let exp = u32::from(self.decimals - target);
            // 10^39 exceeds u128, and any u64 divided by it is 0
            return Some(10u128.checked_pow(exp).map_or(0, |div| amount / div));
        }
        let exp = u32::from(target - self.decimals);
        10u128.checked_pow(exp)?.checked_mul(amount)
    }

    /// Wire format: `[u8 decimals][u64 BE amount]`.
    pub(crate) fn read_wire(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let decimals = r.u8("trimmed_amount.decimals")?;
        let amount = r.u64_be("trimmed_amount.amount")?;
        Ok(Self { amount, decimals })
    }

    pub(crate) fn write_wire(&self, buf: &mut Vec<u8>) {
        buf.push(self.decimals);
        buf.extend_from_slice(&self.amount.to_be_bytes());
    }

    /// Account format: `[u64 LE amount][u8 decimals]`.
    pub(crate) fn read_account(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let amount = r.u64_le("trimmed_amount.amount")?;
        let decimals = r.u8("trimmed_amount.decimals")?;
        Ok(Self { amount, decimals })
    }
}
