//! Schnorr proof of knowledge of a Pedersen opening.
//!
//! Proves knowledge of `(v, r)` with `C = v·G + r·H`:
//!
//! 1. sample `a, b`, send `T = a·G + b·H`
//! 2. challenge `c` (Fiat-Shamir over the transcript)
//! 3. respond `s1 = a + c·v`, `s2 = b + c·r`
//!
//! Verification checks `s1·G + s2·H == T + c·C` and that `c` matches the
//! independently recomputed transcript challenge. The two-phase
//! [`OpeningProver`] exists so a Schnorr proof can share one challenge with
//! other sub-proofs in an AND composition.

use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::MultiscalarMul;
use rand::{CryptoRng, RngCore};

use crate::commitment::Commitment;
use crate::generators::PedersenGens;
use crate::transcript::Transcript;
use crate::RistrettoPoint;

/// In-flight prover state between the first message and the challenge.
pub struct OpeningProver {
    a: Scalar,
    b: Scalar,
    t: CompressedRistretto,
}

impl OpeningProver {
    /// Phase one: sample nonces and compute the first message.
    #[must_use]
    pub fn commit<R: RngCore + CryptoRng>(gens: &PedersenGens, rng: &mut R) -> Self {
        let a = Scalar::random(rng);
        let b = Scalar::random(rng);
        let t = RistrettoPoint::multiscalar_mul([a, b], [gens.g, gens.h]).compress();
        Self { a, b, t }
    }

    /// The first message `T`.
    #[must_use]
    pub const fn first_message(&self) -> &CompressedRistretto {
        &self.t
    }

    /// Phase two: fold the witness into the responses.
    #[must_use]
    pub fn finish(self, challenge: Scalar, value: Scalar, blinding: Scalar) -> OpeningProof {
        OpeningProof {
            t: self.t,
            c: challenge,
            s1: self.a + challenge * value,
            s2: self.b + challenge * blinding,
        }
    }
}

/// A completed Schnorr proof of a Pedersen opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningProof {
    /// First message `T = a·G + b·H`.
    pub t: CompressedRistretto,
    /// Fiat-Shamir challenge.
    pub c: Scalar,
    /// Response over the value.
    pub s1: Scalar,
    /// Response over the blinding.
    pub s2: Scalar,
}

impl OpeningProof {
    /// Produces a standalone proof, deriving the challenge from `transcript`.
    ///
    /// The transcript must already contain all public context; this appends
    /// the first message before squeezing the challenge.
    #[must_use]
    pub fn prove<R: RngCore + CryptoRng>(
        gens: &PedersenGens,
        value: Scalar,
        blinding: Scalar,
        transcript: &mut Transcript,
        rng: &mut R,
    ) -> Self {
        let prover = OpeningProver::commit(gens, rng);
        transcript.append_point(b"schnorr-t", prover.first_message());
        let c = transcript.challenge_scalar(b"c");
        prover.finish(c, value, blinding)
    }

    /// Checks the group equation `s1·G + s2·H == T + c·C` against the
    /// embedded challenge. Challenge freshness is the caller's job.
    #[must_use]
    pub fn verify_equation(&self, gens: &PedersenGens, commitment: &Commitment) -> bool {
        let (Some(t), Ok(c_point)) = (self.t.decompress(), commitment.decompress()) else {
            return false;
        };
        let lhs = RistrettoPoint::multiscalar_mul([self.s1, self.s2], [gens.g, gens.h]);
        lhs == t + self.c * c_point
    }

    /// Full verification: recomputes the transcript challenge and checks
    /// the group equation. Structural presence proves nothing on its own.
    #[must_use]
    pub fn verify(
        &self,
        gens: &PedersenGens,
        commitment: &Commitment,
        transcript: &mut Transcript,
    ) -> bool {
        transcript.append_point(b"schnorr-t", &self.t);
        let expected = transcript.challenge_scalar(b"c");
        expected == self.c && self.verify_equation(gens, commitment)
    }
}
