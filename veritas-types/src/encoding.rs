//! Hex encoding helpers for wire fields.
//!
//! All group elements, scalars, and hashes cross the wire as lowercase hex
//! strings.

use crate::Error;

/// Encodes bytes as a lowercase hex string.
#[must_use]
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decodes a hex string into bytes.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, Error> {
    hex::decode(s).map_err(|e| Error::InvalidHex(e.to_string()))
}

/// Decodes a hex string that must contain exactly 32 bytes.
pub fn decode_array32(s: &str) -> Result<[u8; 32], Error> {
    let bytes = decode_hex(s)?;
    bytes
        .try_into()
        .map_err(|_| Error::InvalidHex("expected 32 bytes".to_string()))
}
