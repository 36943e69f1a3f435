//! Server-side proof verification.
//!
//! `verify` never returns an error: every failure, from a missing
//! commitment to a bad group equation, resolves to a well-formed
//! `VerificationResult` with `valid: false` and a diagnostic reason. The
//! transcript rebuild here mirrors the prover's append order exactly; a
//! proof whose embedded challenge does not match the recomputed one is
//! rejected before any equation is checked in isolation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::RngCore;
use veritas_crypto::{feature_leaf_hash, Commitment, MerkleProof, PedersenGens, Transcript};
use veritas_types::{
    decode_array32, encode_hex, LicenseCommitment, ProofRequest, ProofRequirements, ProvenClaims,
    RequestId, VerificationResult, ZkProof,
};

use crate::codec;
use crate::registry::{ChallengeStatus, CommitmentRegistry};

/// Verifies proofs against registered commitments.
pub struct Verifier {
    gens: PedersenGens,
    registry: Arc<CommitmentRegistry>,
    verified: AtomicU64,
    rejected: AtomicU64,
    cache_hits: AtomicU64,
}

impl Verifier {
    /// Creates a verifier sharing `registry` with the issuer and prover.
    #[must_use]
    pub fn new(registry: Arc<CommitmentRegistry>) -> Self {
        Self {
            gens: PedersenGens::default(),
            registry,
            verified: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    /// Issues a proof request with a fresh single-use challenge.
    #[must_use]
    pub fn create_proof_request(&self, requirements: ProofRequirements) -> ProofRequest {
        let mut challenge = [0u8; 32];
        OsRng.fill_bytes(&mut challenge);
        let now = Utc::now().timestamp();

        let request = ProofRequest {
            request_id: RequestId::new(),
            proof_type: requirements.proof_type(),
            requirements,
            challenge: encode_hex(&challenge),
            expires_at: now + self.registry.config().request_ttl_secs,
        };
        self.registry.insert_request(request.clone(), now);
        tracing::debug!(
            request_id = %request.request_id,
            proof_type = %request.proof_type,
            "proof request issued"
        );
        request
    }

    /// Verifies a proof. Never errors; protocol violations become
    /// `valid: false` results with a reason.
    pub fn verify(&self, proof: &ZkProof) -> VerificationResult {
        let started = Instant::now();
        let now = Utc::now().timestamp();

        let Some(commitment) = self.registry.get(proof.commitment_id) else {
            return self.reject(proof, "commitment not found", started, now);
        };
        if self.registry.is_revoked(proof.commitment_id) {
            return self.reject(proof, "commitment revoked", started, now);
        }

        let request = match self
            .registry
            .consume_challenge(&proof.challenge, proof.proof_id, now)
        {
            ChallengeStatus::Fresh(request) => request,
            ChallengeStatus::AlreadyConsumed { by, request } if by == proof.proof_id => {
                // Idempotent re-verification of the same proof: served
                // from the cache while fresh; once the entry has lapsed
                // (or a concurrent duplicate arrives before the first
                // call caches), the retained request drives a full
                // re-check instead of a rejection.
                if let Some(cached) = self.registry.cached_result(proof.proof_id, now) {
                    self.cache_hits.fetch_add(1, Ordering::Relaxed);
                    return cached;
                }
                request
            }
            ChallengeStatus::AlreadyConsumed { .. } => {
                return self.reject(proof, "challenge already consumed", started, now);
            }
            ChallengeStatus::Expired => {
                return self.reject(proof, "challenge expired", started, now);
            }
            ChallengeStatus::Unknown => {
                return self.reject(proof, "unknown challenge", started, now);
            }
        };

        if request.proof_type != proof.proof_type {
            return self.reject(proof, "proof type does not match request", started, now);
        }
        let requirements = request.requirements;

        if commitment.verification_key_hash != encode_hex(&self.gens.verification_key_hash()) {
            return self.reject(proof, "verification key mismatch", started, now);
        }

        match self.check(&commitment, &requirements, proof) {
            Ok(()) => self.accept(proof, started, now),
            Err(reason) => self.reject(proof, &reason, started, now),
        }
    }

    /// Proofs accepted so far.
    #[must_use]
    pub fn verified_count(&self) -> u64 {
        self.verified.load(Ordering::Relaxed)
    }

    /// Proofs rejected so far.
    #[must_use]
    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Verifications served from the result cache.
    #[must_use]
    pub fn cache_hit_count(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    fn check(
        &self,
        commitment: &LicenseCommitment,
        requirements: &ProofRequirements,
        proof: &ZkProof,
    ) -> Result<(), String> {
        let mut transcript =
            codec::base_transcript(commitment, proof.proof_type, &proof.challenge, &proof.nonce)
                .map_err(|e| e.to_string())?;

        match requirements {
            ProofRequirements::LicenseOwnership {} => {
                self.check_ownership(commitment, proof, &mut transcript)
            }
            ProofRequirements::MinimumTier { minimum_tier } => self.check_shifted_range(
                &commitment.tier_commitment,
                minimum_tier.rank(),
                codec::TIER_DIFF_BITS,
                b"minimum-tier",
                proof,
                &mut transcript,
            ),
            ProofRequirements::CurrentTimestamp { current_timestamp } => {
                if *current_timestamp < 0 {
                    return Err("negative reference timestamp".to_string());
                }
                transcript.append_i64(b"current-timestamp", *current_timestamp);
                let range = codec::unpack_range(
                    &proof.proof,
                    &proof.public_inputs,
                    codec::TIME_DIFF_BITS,
                )
                .map_err(|e| e.to_string())?;
                let expiration = Commitment::from_hex(&commitment.expiration_commitment)
                    .map_err(|e| e.to_string())?;
                let shifted = expiration
                    .shift_value(&self.gens, Scalar::from(*current_timestamp as u64))
                    .map_err(|e| e.to_string())?;
                if !range.verify(&self.gens, &shifted, codec::TIME_DIFF_BITS, &mut transcript) {
                    return Err("range proof does not verify".to_string());
                }
                Ok(())
            }
            ProofRequirements::RequiredFeature { required_feature } => {
                self.check_feature(commitment, required_feature, proof, &mut transcript)
            }
            ProofRequirements::RequiredQuota { required_quota } => {
                transcript.append_u64(b"required-quota", *required_quota);
                self.check_combined(commitment, codec::QUOTA_DIFF_BITS, proof, &mut transcript)
            }
            ProofRequirements::RequestedWorkers { requested_workers } => {
                transcript.append_u64(b"requested-workers", *requested_workers);
                self.check_combined(commitment, codec::WORKER_DIFF_BITS, proof, &mut transcript)
            }
        }
    }

    fn check_ownership(
        &self,
        commitment: &LicenseCommitment,
        proof: &ZkProof,
        transcript: &mut Transcript,
    ) -> Result<(), String> {
        let opening = codec::unpack_opening(&proof.proof).map_err(|e| e.to_string())?;
        let key = Commitment::from_hex(&commitment.commitment).map_err(|e| e.to_string())?;
        if !opening.verify(&self.gens, &key, transcript) {
            return Err("opening proof does not verify".to_string());
        }
        Ok(())
    }

    /// Tier membership: the shift is recomputed from the issuer's
    /// commitment and the public minimum, so the range proof is bound to
    /// committed data the prover never chose.
    fn check_shifted_range(
        &self,
        commitment_hex: &str,
        public_delta: u64,
        n_bits: usize,
        delta_label: &'static [u8],
        proof: &ZkProof,
        transcript: &mut Transcript,
    ) -> Result<(), String> {
        transcript.append_u64(delta_label, public_delta);
        let range = codec::unpack_range(&proof.proof, &proof.public_inputs, n_bits)
            .map_err(|e| e.to_string())?;
        let outer = Commitment::from_hex(commitment_hex).map_err(|e| e.to_string())?;
        let shifted = outer
            .shift_value(&self.gens, Scalar::from(public_delta))
            .map_err(|e| e.to_string())?;
        if !range.verify(&self.gens, &shifted, n_bits, transcript) {
            return Err("range proof does not verify".to_string());
        }
        Ok(())
    }

    /// Feature access: the leaf is re-derived from the requested feature
    /// name, never taken from the proof, so the path can only validate
    /// against the committed feature set.
    fn check_feature(
        &self,
        commitment: &LicenseCommitment,
        required_feature: &str,
        proof: &ZkProof,
        transcript: &mut Transcript,
    ) -> Result<(), String> {
        let path = codec::unpack_merkle_path(&proof.public_inputs).map_err(|e| e.to_string())?;
        let leaf = feature_leaf_hash(required_feature);
        let root = decode_array32(&commitment.feature_merkle_root).map_err(|e| e.to_string())?;
        let merkle = MerkleProof { leaf, path };
        if !merkle.verify(&root) {
            return Err("feature not in committed set".to_string());
        }

        transcript.append(b"required-feature", required_feature.as_bytes());
        transcript.append(b"merkle-leaf", &merkle.leaf);
        codec::append_merkle_path(transcript, &merkle.path);
        self.check_ownership(commitment, proof, transcript)
    }

    /// Quota and worker proofs: an ownership proof and a range proof over
    /// a difference commitment under one shared challenge.
    fn check_combined(
        &self,
        commitment: &LicenseCommitment,
        n_bits: usize,
        proof: &ZkProof,
        transcript: &mut Transcript,
    ) -> Result<(), String> {
        let Some((diff_hex, bit_hex)) = proof.public_inputs.split_first() else {
            return Err("missing difference commitment".to_string());
        };
        let diff_commitment = Commitment::from_hex(diff_hex).map_err(|e| e.to_string())?;
        let (opening, range) =
            codec::unpack_combined(&proof.proof, bit_hex, n_bits).map_err(|e| e.to_string())?;

        transcript.append_point(b"difference-commitment", diff_commitment.as_compressed());
        range.append_bit_commitments(transcript);
        transcript.append_point(b"schnorr-t", &opening.t);
        range.append_first_messages(transcript);

        let expected = transcript.challenge_scalar(b"c");
        if expected != opening.c || expected != range.challenge {
            return Err("challenge mismatch".to_string());
        }

        let key = Commitment::from_hex(&commitment.commitment).map_err(|e| e.to_string())?;
        if !opening.verify_equation(&self.gens, &key) {
            return Err("opening proof does not verify".to_string());
        }
        if !range.verify_equations(&self.gens, &diff_commitment, n_bits) {
            return Err("range proof does not verify".to_string());
        }
        Ok(())
    }

    fn accept(&self, proof: &ZkProof, started: Instant, now: i64) -> VerificationResult {
        let result = VerificationResult {
            valid: true,
            proof_id: proof.proof_id,
            verified_at: now,
            proven_claims: ProvenClaims::for_type(proof.proof_type),
            verification_time_micros: started.elapsed().as_micros() as u64,
            reason: None,
        };
        self.registry.cache_result(result.clone(), now);
        self.verified.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            proof_id = %proof.proof_id,
            proof_type = %proof.proof_type,
            "proof verified"
        );
        result
    }

    fn reject(
        &self,
        proof: &ZkProof,
        reason: &str,
        started: Instant,
        now: i64,
    ) -> VerificationResult {
        let result = VerificationResult {
            valid: false,
            proof_id: proof.proof_id,
            verified_at: now,
            proven_claims: ProvenClaims::default(),
            verification_time_micros: started.elapsed().as_micros() as u64,
            reason: Some(reason.to_string()),
        };
        self.registry.cache_result(result.clone(), now);
        self.rejected.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            proof_id = %proof.proof_id,
            proof_type = %proof.proof_type,
            reason,
            "proof rejected"
        );
        result
    }
}
