//! Bit-decomposition range proof.
//!
//! Proves that a Pedersen commitment `C = v·G + r·H` opens to a value in
//! `[0, 2^n)` without revealing `v`:
//!
//! - the prover commits to each bit, `C_i = b_i·G + r_i·H`, choosing the
//!   bit blindings so that `Σ 2^i·r_i = r`; the verifier checks
//!   `Σ 2^i·C_i == C` exactly, which binds the bits to the original
//!   commitment;
//! - for each bit, a two-branch OR proof (Chaum-Pedersen disjunction)
//!   shows `C_i` opens to 0 or 1: the true branch is proven with a fresh
//!   nonce, the false branch is simulated, and the two sub-challenges must
//!   sum to the global Fiat-Shamir challenge.
//!
//! A bare difference commitment proves nothing about sign; the per-bit OR
//! proofs are what make non-negativity sound. The two-phase
//! [`RangeProver`] exists so the range proof can share one challenge with
//! a Schnorr sub-proof in an AND composition.

use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use rand::{CryptoRng, RngCore};

use crate::commitment::Commitment;
use crate::error::{CryptoError, CryptoResult};
use crate::generators::PedersenGens;
use crate::transcript::Transcript;
use crate::RistrettoPoint;

/// OR proof for a single bit commitment.
///
/// Branch 0 claims `C_i = r·H` (bit is 0); branch 1 claims
/// `C_i − G = r·H` (bit is 1). `c1` is implicit: `c1 = c − c0` for the
/// global challenge `c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitProof {
    /// First message for branch 0.
    pub t0: CompressedRistretto,
    /// First message for branch 1.
    pub t1: CompressedRistretto,
    /// Sub-challenge for branch 0.
    pub c0: Scalar,
    /// Response for branch 0.
    pub s0: Scalar,
    /// Response for branch 1.
    pub s1: Scalar,
}

struct BitState {
    bit: bool,
    blinding: Scalar,
    nonce: Scalar,
    fake_challenge: Scalar,
    fake_response: Scalar,
}

/// In-flight range prover between first messages and the challenge.
pub struct RangeProver {
    states: Vec<BitState>,
    bit_commitments: Vec<CompressedRistretto>,
    first_messages: Vec<(CompressedRistretto, CompressedRistretto)>,
}

impl RangeProver {
    /// Phase one: decompose the value, commit to every bit, and prepare
    /// the per-bit OR first messages (simulating the false branch).
    ///
    /// # Errors
    ///
    /// `InvalidBitWidth` outside 1..=64; `ValueOutOfRange` when the value
    /// does not fit `n_bits`. Callers reject false statements before this
    /// point, this is a final guard.
    pub fn commit<R: RngCore + CryptoRng>(
        gens: &PedersenGens,
        value: u64,
        blinding: Scalar,
        n_bits: usize,
        rng: &mut R,
    ) -> CryptoResult<Self> {
        if n_bits == 0 || n_bits > 64 {
            return Err(CryptoError::InvalidBitWidth(n_bits));
        }
        if n_bits < 64 && value >> n_bits != 0 {
            return Err(CryptoError::ValueOutOfRange {
                value,
                bits: n_bits,
            });
        }

        // Bit blindings constrained so Σ 2^i·r_i equals the outer blinding.
        let mut blindings = vec![Scalar::ZERO; n_bits];
        let mut weighted_tail = Scalar::ZERO;
        for (i, r_i) in blindings.iter_mut().enumerate().skip(1) {
            *r_i = Scalar::random(rng);
            weighted_tail += Scalar::from(1u64 << i) * *r_i;
        }
        blindings[0] = blinding - weighted_tail;

        let mut states = Vec::with_capacity(n_bits);
        let mut bit_commitments = Vec::with_capacity(n_bits);
        let mut first_messages = Vec::with_capacity(n_bits);

        for (i, &r_i) in blindings.iter().enumerate() {
            let bit = (value >> i) & 1 == 1;
            let c_i = if bit {
                gens.g + r_i * gens.h
            } else {
                r_i * gens.h
            };
            let branch1_point = c_i - gens.g;

            let nonce = Scalar::random(rng);
            let fake_challenge = Scalar::random(rng);
            let fake_response = Scalar::random(rng);

            // Real branch: T = k·H. False branch simulated backwards so
            // its verification equation holds for the chosen sub-challenge.
            let (t0, t1) = if bit {
                let t0 = fake_response * gens.h - fake_challenge * c_i;
                let t1 = nonce * gens.h;
                (t0, t1)
            } else {
                let t0 = nonce * gens.h;
                let t1 = fake_response * gens.h - fake_challenge * branch1_point;
                (t0, t1)
            };

            states.push(BitState {
                bit,
                blinding: r_i,
                nonce,
                fake_challenge,
                fake_response,
            });
            bit_commitments.push(c_i.compress());
            first_messages.push((t0.compress(), t1.compress()));
        }

        Ok(Self {
            states,
            bit_commitments,
            first_messages,
        })
    }

    /// The per-bit commitments `C_i`.
    #[must_use]
    pub fn bit_commitments(&self) -> &[CompressedRistretto] {
        &self.bit_commitments
    }

    /// Appends the bit commitments to the transcript.
    pub fn append_bit_commitments(&self, transcript: &mut Transcript) {
        for c_i in &self.bit_commitments {
            transcript.append_point(b"range-bit-commitment", c_i);
        }
    }

    /// Appends the per-bit first messages to the transcript.
    pub fn append_first_messages(&self, transcript: &mut Transcript) {
        for (t0, t1) in &self.first_messages {
            transcript.append_point(b"range-t0", t0);
            transcript.append_point(b"range-t1", t1);
        }
    }

    /// Phase two: split the global challenge per bit and fold in the
    /// witness on the true branch.
    #[must_use]
    pub fn finish(self, challenge: Scalar) -> RangeProof {
        let bits = self
            .states
            .iter()
            .zip(&self.first_messages)
            .map(|(state, &(t0, t1))| {
                if state.bit {
                    let c0 = state.fake_challenge;
                    let c1 = challenge - c0;
                    BitProof {
                        t0,
                        t1,
                        c0,
                        s0: state.fake_response,
                        s1: state.nonce + c1 * state.blinding,
                    }
                } else {
                    let c1 = state.fake_challenge;
                    let c0 = challenge - c1;
                    BitProof {
                        t0,
                        t1,
                        c0,
                        s0: state.nonce + c0 * state.blinding,
                        s1: state.fake_response,
                    }
                }
            })
            .collect();

        RangeProof {
            bit_commitments: self.bit_commitments,
            bits,
            challenge,
        }
    }
}

/// A completed range proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeProof {
    /// Per-bit Pedersen commitments.
    pub bit_commitments: Vec<CompressedRistretto>,
    /// Per-bit OR proofs.
    pub bits: Vec<BitProof>,
    /// Global Fiat-Shamir challenge.
    pub challenge: Scalar,
}

impl RangeProof {
    /// Produces a standalone proof, deriving the challenge from `transcript`.
    pub fn prove<R: RngCore + CryptoRng>(
        gens: &PedersenGens,
        value: u64,
        blinding: Scalar,
        n_bits: usize,
        transcript: &mut Transcript,
        rng: &mut R,
    ) -> CryptoResult<Self> {
        let prover = RangeProver::commit(gens, value, blinding, n_bits, rng)?;
        prover.append_bit_commitments(transcript);
        prover.append_first_messages(transcript);
        let c = transcript.challenge_scalar(b"c");
        Ok(prover.finish(c))
    }

    /// Appends the stored bit commitments (verifier-side transcript rebuild).
    pub fn append_bit_commitments(&self, transcript: &mut Transcript) {
        for c_i in &self.bit_commitments {
            transcript.append_point(b"range-bit-commitment", c_i);
        }
    }

    /// Appends the stored first messages (verifier-side transcript rebuild).
    pub fn append_first_messages(&self, transcript: &mut Transcript) {
        for bit in &self.bits {
            transcript.append_point(b"range-t0", &bit.t0);
            transcript.append_point(b"range-t1", &bit.t1);
        }
    }

    /// Checks every group equation against the embedded challenge:
    /// per-bit OR equations plus the weighted-sum binding to `commitment`.
    /// Challenge freshness is the caller's job.
    #[must_use]
    pub fn verify_equations(
        &self,
        gens: &PedersenGens,
        commitment: &Commitment,
        n_bits: usize,
    ) -> bool {
        if self.bits.len() != n_bits || self.bit_commitments.len() != n_bits {
            return false;
        }
        let Ok(outer) = commitment.decompress() else {
            return false;
        };

        let mut weighted_sum = RistrettoPoint::identity();
        for (i, (compressed, bit)) in self.bit_commitments.iter().zip(&self.bits).enumerate() {
            let (Some(c_i), Some(t0), Some(t1)) = (
                compressed.decompress(),
                bit.t0.decompress(),
                bit.t1.decompress(),
            ) else {
                return false;
            };

            let c1 = self.challenge - bit.c0;
            // Branch 0: s0·H == T0 + c0·C_i
            if bit.s0 * gens.h != t0 + bit.c0 * c_i {
                return false;
            }
            // Branch 1: s1·H == T1 + c1·(C_i − G)
            if bit.s1 * gens.h != t1 + c1 * (c_i - gens.g) {
                return false;
            }

            weighted_sum += Scalar::from(1u64 << i) * c_i;
        }

        weighted_sum == outer
    }

    /// Full verification: rebuilds the transcript, recomputes the global
    /// challenge, and checks all group equations.
    #[must_use]
    pub fn verify(
        &self,
        gens: &PedersenGens,
        commitment: &Commitment,
        n_bits: usize,
        transcript: &mut Transcript,
    ) -> bool {
        if self.bits.len() != n_bits || self.bit_commitments.len() != n_bits {
            return false;
        }
        self.append_bit_commitments(transcript);
        self.append_first_messages(transcript);
        let expected = transcript.challenge_scalar(b"c");
        expected == self.challenge && self.verify_equations(gens, commitment, n_bits)
    }
}
