//! Wire structures for the commitment-and-proof protocol.
//!
//! JSON with camelCase field names; group elements, scalars, and hashes are
//! hex-encoded strings. These are the only shapes that cross between client
//! and verifier; the private witness types never appear here.

use crate::{CommitmentId, ProofId, ProofRequirements, ProofType, RequestId};
use serde::{Deserialize, Serialize};

/// The public binding published by the issuer for one license.
///
/// Immutable once created. Contains commitments only; no field reveals the
/// license key, tier rank, or expiration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseCommitment {
    /// Identifier the verifier stores this record under.
    pub commitment_id: CommitmentId,
    /// Pedersen commitment to the license key scalar (hex point).
    pub commitment: String,
    /// Pedersen commitment to the tier rank (hex point).
    pub tier_commitment: String,
    /// Pedersen commitment to the expiration timestamp (hex point).
    pub expiration_commitment: String,
    /// Merkle root over the tier's enabled feature set (hex, 32 bytes).
    pub feature_merkle_root: String,
    /// Hash of the verification parameters the proofs were built against.
    pub verification_key_hash: String,
    /// Creation time (seconds since epoch).
    pub created_at: i64,
}

/// A verifier's question: one proof request with a single-use challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequest {
    pub request_id: RequestId,
    pub proof_type: ProofType,
    pub requirements: ProofRequirements,
    /// Single-use 256-bit random challenge (hex).
    pub challenge: String,
    /// Expiry (seconds since epoch); proofs against an expired request fail.
    pub expires_at: i64,
}

/// The algebraic proof triple.
///
/// `a` packs the Σ-protocol first message(s), `b` the response scalar(s),
/// `c` the Fiat-Shamir challenge scalar. All hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofTriple {
    pub a: String,
    pub b: String,
    pub c: String,
}

/// A client's answer to a proof request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZkProof {
    pub proof_id: ProofId,
    pub proof_type: ProofType,
    pub proof: ProofTriple,
    /// Auxiliary public data (bit commitments, difference commitments,
    /// Merkle path steps), hex-encoded.
    pub public_inputs: Vec<String>,
    pub commitment_id: CommitmentId,
    /// Prover-chosen nonce absorbed into the Fiat-Shamir transcript (hex).
    pub nonce: String,
    /// The request challenge this proof answers (hex).
    pub challenge: String,
    /// Always false on the wire; outcomes travel in `VerificationResult`.
    pub verified: bool,
}

/// The booleans a verifier may assert from a single proof.
///
/// Only the field corresponding to the proof's declared type is ever set;
/// no magnitudes appear here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenClaims {
    pub owns_license: bool,
    pub meets_tier_requirement: bool,
    pub has_feature: bool,
    pub has_quota: bool,
    pub within_worker_limit: bool,
    pub not_expired: bool,
}

impl ProvenClaims {
    /// Returns claims with only the boolean for `proof_type` set.
    #[must_use]
    pub fn for_type(proof_type: ProofType) -> Self {
        let mut claims = Self::default();
        match proof_type {
            ProofType::LicenseOwnership => claims.owns_license = true,
            ProofType::TierMembership => claims.meets_tier_requirement = true,
            ProofType::FeatureAccess => claims.has_feature = true,
            ProofType::UsageQuota => claims.has_quota = true,
            ProofType::TimeValidity => claims.not_expired = true,
            ProofType::WorkerAllocation => claims.within_worker_limit = true,
        }
        claims
    }
}

/// Outcome of one verification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub valid: bool,
    pub proof_id: ProofId,
    /// When the verification ran (seconds since epoch).
    pub verified_at: i64,
    pub proven_claims: ProvenClaims,
    /// Verification latency in microseconds.
    #[serde(rename = "verificationTime")]
    pub verification_time_micros: u64,
    /// Diagnostic reason on rejection; absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
