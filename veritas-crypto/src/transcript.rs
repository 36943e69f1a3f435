//! Fiat-Shamir transcript.
//!
//! A SHA-512 accumulator with labeled, length-prefixed appends. Challenges
//! are squeezed as scalars via `Scalar::from_hash`. Every value that
//! influences soundness (commitment state, first messages, the request
//! challenge, the proof nonce, public context) must be appended before a
//! challenge is squeezed, or the resulting proof is forgeable.

use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};

/// A running Fiat-Shamir transcript.
#[derive(Clone)]
pub struct Transcript {
    hasher: Sha512,
}

impl Transcript {
    /// Starts a transcript under a protocol domain tag.
    #[must_use]
    pub fn new(domain: &'static [u8]) -> Self {
        let mut hasher = Sha512::new();
        hasher.update(b"veritas.transcript.v1");
        hasher.update((domain.len() as u64).to_le_bytes());
        hasher.update(domain);
        Self { hasher }
    }

    /// Appends labeled bytes (length-prefixed to prevent ambiguity).
    pub fn append(&mut self, label: &'static [u8], bytes: &[u8]) {
        self.hasher.update((label.len() as u64).to_le_bytes());
        self.hasher.update(label);
        self.hasher.update((bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }

    /// Appends a compressed group element.
    pub fn append_point(&mut self, label: &'static [u8], point: &CompressedRistretto) {
        self.append(label, point.as_bytes());
    }

    /// Appends a scalar.
    pub fn append_scalar(&mut self, label: &'static [u8], scalar: &Scalar) {
        self.append(label, scalar.as_bytes());
    }

    /// Appends a u64 in little-endian.
    pub fn append_u64(&mut self, label: &'static [u8], value: u64) {
        self.append(label, &value.to_le_bytes());
    }

    /// Appends an i64 in little-endian.
    pub fn append_i64(&mut self, label: &'static [u8], value: i64) {
        self.append(label, &value.to_le_bytes());
    }

    /// Squeezes a challenge scalar from the current transcript state.
    ///
    /// Does not consume the transcript; the label separates multiple
    /// challenges drawn from the same state.
    #[must_use]
    pub fn challenge_scalar(&self, label: &'static [u8]) -> Scalar {
        let mut hasher = self.hasher.clone();
        hasher.update((label.len() as u64).to_le_bytes());
        hasher.update(label);
        Scalar::from_hash(hasher)
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript").finish_non_exhaustive()
    }
}
