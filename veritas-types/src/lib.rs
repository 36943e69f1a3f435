//! Core type definitions for the Veritas license proof protocol.
//!
//! This crate defines the crypto-agnostic types shared by the prover and
//! verifier sides:
//! - Commitment, proof, and request identifiers (UUID v4)
//! - License tiers and their feature/quota tables
//! - Proof types and per-type requirement unions
//! - Wire structures (JSON, hex-encoded group elements)
//!
//! The cryptographic machinery (commitments, Σ-protocols, Merkle trees)
//! lives in `veritas-crypto`; the protocol state machines live in
//! `veritas-protocol`.

mod encoding;
mod ids;
mod proof;
mod tier;
mod wire;

pub use encoding::{decode_array32, decode_hex, encode_hex};
pub use ids::{CommitmentId, ProofId, RequestId};
pub use proof::{ProofRequirements, ProofType};
pub use tier::LicenseTier;
pub use wire::{
    LicenseCommitment, ProofRequest, ProofTriple, ProvenClaims, VerificationResult, ZkProof,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("unknown tier rank: {0}")]
    UnknownTierRank(u64),
}
