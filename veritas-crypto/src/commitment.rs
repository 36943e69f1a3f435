//! Pedersen commitment values.
//!
//! A commitment is a compressed Ristretto point. Arithmetic helpers cover
//! the homomorphic operations the proof types need: adding and subtracting
//! commitments, and shifting the committed value by a public constant
//! without touching the blinding.

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};
use crate::generators::PedersenGens;

/// A Pedersen commitment `C = v·G + r·H`, stored compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment {
    point: CompressedRistretto,
}

impl Commitment {
    /// Wraps a group element as a commitment.
    #[must_use]
    pub fn from_point(point: RistrettoPoint) -> Self {
        Self {
            point: point.compress(),
        }
    }

    /// Returns the compressed point.
    #[must_use]
    pub const fn as_compressed(&self) -> &CompressedRistretto {
        &self.point
    }

    /// Returns the 32 compressed bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        self.point.as_bytes()
    }

    /// Hex encoding for the wire.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Parses a hex-encoded commitment, validating it decompresses.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes: [u8; 32] = hex::decode(s)
            .map_err(|e| CryptoError::InvalidHex(e.to_string()))?
            .try_into()
            .map_err(|_| CryptoError::InvalidHex("expected 32 bytes".to_string()))?;
        let point = CompressedRistretto(bytes);
        point.decompress().ok_or(CryptoError::InvalidPoint)?;
        Ok(Self { point })
    }

    /// Decompresses to the underlying group element.
    pub fn decompress(&self) -> CryptoResult<RistrettoPoint> {
        self.point.decompress().ok_or(CryptoError::InvalidPoint)
    }

    /// Homomorphic addition: `commit(a, r1) + commit(b, r2) = commit(a+b, r1+r2)`.
    pub fn add(&self, other: &Self) -> CryptoResult<Self> {
        Ok(Self::from_point(self.decompress()? + other.decompress()?))
    }

    /// Homomorphic subtraction.
    pub fn sub(&self, other: &Self) -> CryptoResult<Self> {
        Ok(Self::from_point(self.decompress()? - other.decompress()?))
    }

    /// Shifts the committed value down by a public constant:
    /// `C − delta·G` commits to `v − delta` under the same blinding.
    ///
    /// This is how range proofs bind to issuer commitments: the verifier
    /// recomputes the shifted commitment itself from public data.
    pub fn shift_value(&self, gens: &PedersenGens, delta: Scalar) -> CryptoResult<Self> {
        Ok(Self::from_point(self.decompress()? - delta * gens.g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn hex_roundtrip() {
        let gens = PedersenGens::default();
        let c = gens.commit(Scalar::from(42u64), Scalar::random(&mut OsRng));
        let back = Commitment::from_hex(&c.to_hex()).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn from_hex_rejects_non_point() {
        // All-0xff is not a canonical Ristretto encoding.
        assert!(Commitment::from_hex(&"ff".repeat(32)).is_err());
    }

    #[test]
    fn shift_value_matches_direct_commitment() {
        let gens = PedersenGens::default();
        let r = Scalar::random(&mut OsRng);
        let c = gens.commit(Scalar::from(100u64), r);
        let shifted = c.shift_value(&gens, Scalar::from(30u64)).unwrap();
        assert_eq!(shifted, gens.commit(Scalar::from(70u64), r));
    }
}
