//! Pedersen generator pair.
//!
//! `G` is the Ristretto basepoint. `H` is derived by hash-to-curve with a
//! fixed domain-separation tag, so `log_G(H)` is unknown to everyone.
//! The binding property of the commitment scheme rests on that.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::MultiscalarMul;
use sha2::{Digest, Sha256, Sha512};

use crate::commitment::Commitment;

/// Domain separator for deriving the blinding generator.
const BLINDING_GENERATOR_DOMAIN: &[u8] = b"veritas.pedersen.blinding-generator.v1";

/// The generator pair for Pedersen commitments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PedersenGens {
    /// Value generator (Ristretto basepoint).
    pub g: RistrettoPoint,
    /// Blinding generator (hash-to-curve, discrete log unknown).
    pub h: RistrettoPoint,
}

impl Default for PedersenGens {
    fn default() -> Self {
        let mut hasher = Sha512::new();
        hasher.update(BLINDING_GENERATOR_DOMAIN);
        Self {
            g: RISTRETTO_BASEPOINT_POINT,
            h: RistrettoPoint::from_hash(hasher),
        }
    }
}

impl PedersenGens {
    /// Commits to `value` with the given blinding: `C = value·G + blinding·H`.
    ///
    /// Deterministic in its inputs, hiding in `blinding`, and additively
    /// homomorphic under point addition.
    #[must_use]
    pub fn commit(&self, value: Scalar, blinding: Scalar) -> Commitment {
        let point = RistrettoPoint::multiscalar_mul([value, blinding], [self.g, self.h]);
        Commitment::from_point(point)
    }

    /// Checks an opening: recomputes the commitment and compares.
    ///
    /// Returns `false` for any well-formed but incorrect opening; never
    /// errors.
    #[must_use]
    pub fn open(&self, commitment: &Commitment, value: Scalar, blinding: Scalar) -> bool {
        self.commit(value, blinding) == *commitment
    }

    /// Hash of the verification parameters, published alongside commitments
    /// so a verifier can detect generator mismatch.
    #[must_use]
    pub fn verification_key_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.g.compress().as_bytes());
        hasher.update(self.h.compress().as_bytes());
        hasher.finalize().into()
    }
}
