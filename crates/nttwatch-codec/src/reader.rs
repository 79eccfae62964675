//! Bounds-checked cursor over an immutable byte buffer.
//!
//! Every read either returns the requested bytes or a
//! [`CodecError::MalformedPayload`] naming the field that ran short; the
//! cursor never panics on short input.

use crate::error::CodecError;

/// Forward-only reader over `&[u8]`.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Take the next `len` bytes.
    pub fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8], CodecError> {
        if self.remaining() < len {
            return Err(CodecError::malformed(format!(
                "{field}: need {len} bytes at offset {}, only {} left",
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Skip `len` bytes.
    pub fn skip(&mut self, len: usize, field: &str) -> Result<(), CodecError> {
        self.take(len, field).map(|_| ())
    }

    /// Everything after the cursor.
    pub fn rest(&mut self) -> &'a [u8] {
        let out = &self.data[self.pos..];
        self.pos = self.data.len();
        out
    }

    pub fn array<const N: usize>(&mut self, field: &str) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    pub fn u8(&mut self, field: &str) -> Result<u8, CodecError> {
        Ok(self.array::<1>(field)?[0])
    }

    pub fn u16_be(&mut self, field: &str) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.array(field)?))
    }

    pub fn u16_le(&mut self, field: &str) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.array(field)?))
    }

    pub fn u64_be(&mut self, field: &str) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.array(field)?))
    }

    pub fn u64_le(&mut self, field: &str) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.array(field)?))
    }

    pub fn i64_le(&mut self, field: &str) -> Result<i64, CodecError> {
        Ok(i64::from_le_bytes(self.array(field)?))
    }

    pub fn u128_le(&mut self, field: &str) -> Result<u128, CodecError> {
        Ok(u128::from_le_bytes(self.array(field)?))
    }

    /// A field preceded by a 2-byte big-endian length.
    pub fn length_prefixed(&mut self, field: &str) -> Result<&'a [u8], CodecError> {
        let len = self.u16_be(field)? as usize;
        if self.remaining() < len {
            return Err(CodecError::malformed(format!(
                "{field}: declared length {len} runs past end of buffer ({} left)",
                self.remaining()
            )));
        }
        self.take(len, field)
    }
}

/// Append `bytes` preceded by its 2-byte big-endian length.
pub(crate) fn write_length_prefixed(
    buf: &mut Vec<u8>,
    field: &'static str,
    bytes: &[u8],
) -> Result<(), CodecError> {
    let len = u16::try_from(bytes.len()).map_err(|_| {
        CodecError::invalid_field(field, format!("{} bytes exceeds u16 length prefix", bytes.len()))
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_mixed_endianness() {
        let data = [0x01, 0x02, 0x02, 0x01, 0xff];
        let mut r = Reader::new(&data);
        assert_eq!(r.u16_be("a").unwrap(), 0x0102);
        assert_eq!(r.u16_le("b").unwrap(), 0x0102);
        assert_eq!(r.u8("c").unwrap(), 0xff);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn short_read_is_malformed() {
        let mut r = Reader::new(&[0u8; 3]);
        let err = r.u64_le("amount").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("amount"));
        // a failed read does not move the cursor
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn length_prefix_overrun() {
        let mut r = Reader::new(&[0x00, 0x05, 1, 2]);
        let err = r.length_prefixed("payload").unwrap_err();
        assert!(err.to_string().contains("declared length 5"));
    }

    #[test]
    fn write_length_prefixed_rejects_oversize() {
        let mut buf = Vec::new();
        let big = vec![0u8; u16::MAX as usize + 1];
        let err = write_length_prefixed(&mut buf, "payload", &big).unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { field: "payload", .. }));
    }
}
