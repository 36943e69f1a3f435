//! Error types for the crypto primitives.

use thiserror::Error;

/// Crypto-specific errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A compressed point failed to decompress to a valid group element.
    #[error("invalid point encoding")]
    InvalidPoint,

    /// A scalar encoding was not canonical.
    #[error("invalid scalar encoding")]
    InvalidScalar,

    /// A hex field could not be decoded.
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    /// A witness value does not fit the requested range-proof width.
    #[error("value {value} out of range for {bits}-bit proof")]
    ValueOutOfRange { value: u64, bits: usize },

    /// Range proofs support 1..=64 bits.
    #[error("unsupported range-proof bit width: {0}")]
    InvalidBitWidth(usize),

    /// Merkle trees require at least one feature.
    #[error("feature set is empty")]
    EmptyFeatureSet,

    /// The requested feature is not a leaf of this tree.
    #[error("feature not in tree: {0}")]
    UnknownFeature(String),
}

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
