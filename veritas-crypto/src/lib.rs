//! Cryptographic primitives for the Veritas license proof protocol.
//!
//! This crate provides:
//! - Pedersen commitments over the Ristretto group (`C = v·G + r·H`),
//!   hiding, binding, and additively homomorphic
//! - A Fiat-Shamir transcript for deriving non-interactive challenges
//! - Schnorr proofs of knowledge of a Pedersen opening
//! - Bit-decomposition range proofs (non-negativity via per-bit OR proofs)
//! - An append-only Merkle tree over feature sets with inclusion proofs
//!
//! All group arithmetic happens on actual curve points via
//! `curve25519-dalek`; nothing here is modular arithmetic on bare integers.
//! The discrete log between the two Pedersen generators is unknown (`H` is
//! derived by hash-to-curve), which is what makes the commitments binding.

mod commitment;
mod error;
mod generators;
mod merkle;
mod range;
mod schnorr;
mod transcript;

pub use commitment::Commitment;
pub use error::{CryptoError, CryptoResult};
pub use generators::PedersenGens;
pub use merkle::{feature_leaf_hash, FeatureTree, MerkleProof, MerkleStep};
pub use range::{BitProof, RangeProof, RangeProver};
pub use schnorr::{OpeningProof, OpeningProver};
pub use transcript::Transcript;

// Re-exported so downstream crates use one consistent scalar/point API.
pub use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
pub use curve25519_dalek::scalar::Scalar;
