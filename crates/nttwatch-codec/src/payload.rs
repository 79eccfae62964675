//! Payload traits: how a manager message's typed payload is (de)serialized.

use crate::error::CodecError;

/// A payload carried in the platform-neutral wire format.
pub trait WirePayload: Sized {
    fn decode_wire(data: &[u8]) -> Result<Self, CodecError>;
    fn encode_wire(&self) -> Result<Vec<u8>, CodecError>;
}

/// A payload stored in the Solana account format.
pub trait AccountPayload: Sized {
    fn decode_account(data: &[u8]) -> Result<Self, CodecError>;
}

/// Opaque payloads are passed through untouched.
impl WirePayload for Vec<u8> {
    fn decode_wire(data: &[u8]) -> Result<Self, CodecError> {
        Ok(data.to_vec())
    }

    fn encode_wire(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.clone())
    }
}

impl AccountPayload for Vec<u8> {
    fn decode_account(data: &[u8]) -> Result<Self, CodecError> {
        Ok(data.to_vec())
    }
}
