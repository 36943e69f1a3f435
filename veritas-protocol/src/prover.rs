//! Client-side proof generation.
//!
//! Ordering matters here: the rate limiter runs before any witness check
//! or group operation, so a flooding client burns its own quota without
//! costing the verifier curve arithmetic. Witness checks run next and
//! reject false statements with typed errors before any proof is built;
//! a proof over a false statement is never constructed, not constructed
//! and then found invalid.

use std::sync::Arc;

use chrono::Utc;
use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::RngCore;
use veritas_crypto::{
    OpeningProof, OpeningProver, PedersenGens, RangeProof, RangeProver, Transcript,
};
use veritas_types::{
    encode_hex, LicenseCommitment, ProofId, ProofRequest, ProofRequirements, ProofTriple, ZkProof,
};

use crate::codec;
use crate::error::{ProtocolError, ProtocolResult};
use crate::registry::CommitmentRegistry;
use crate::witness::LicenseSecret;

/// Generates proofs from a license secret against proof requests.
pub struct ProofGenerator {
    gens: PedersenGens,
    registry: Arc<CommitmentRegistry>,
}

impl ProofGenerator {
    /// Creates a generator sharing `registry` with the verifier.
    #[must_use]
    pub fn new(registry: Arc<CommitmentRegistry>) -> Self {
        Self {
            gens: PedersenGens::default(),
            registry,
        }
    }

    /// Answers a proof request.
    ///
    /// # Errors
    ///
    /// `RateLimitExceeded` before anything else; `RequestExpired` and
    /// `RequirementsMismatch` for bad requests; witness violations
    /// (`TierBelowMinimum`, `LicenseExpired`, `InsufficientQuota`,
    /// `ExceedsWorkerLimit`, `FeatureNotLicensed`) when the secret does
    /// not satisfy the statement.
    pub fn generate(
        &self,
        secret: &LicenseSecret,
        commitment: &LicenseCommitment,
        request: &ProofRequest,
    ) -> ProtocolResult<ZkProof> {
        let now = Utc::now().timestamp();
        self.registry
            .check_rate_limit(commitment.commitment_id, now)?;

        if now >= request.expires_at {
            return Err(ProtocolError::RequestExpired(request.expires_at));
        }
        if !request.requirements.matches(request.proof_type) {
            return Err(ProtocolError::RequirementsMismatch(request.proof_type));
        }

        let mut nonce_bytes = [0u8; 16];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = encode_hex(&nonce_bytes);

        let mut transcript =
            codec::base_transcript(commitment, request.proof_type, &request.challenge, &nonce)?;

        let (triple, public_inputs) = match &request.requirements {
            ProofRequirements::LicenseOwnership {} => self.prove_ownership(secret, &mut transcript),
            ProofRequirements::MinimumTier { minimum_tier } => {
                self.prove_tier(secret, minimum_tier.rank(), &mut transcript)?
            }
            ProofRequirements::CurrentTimestamp { current_timestamp } => {
                self.prove_time_validity(secret, *current_timestamp, &mut transcript)?
            }
            ProofRequirements::RequiredFeature { required_feature } => {
                self.prove_feature(secret, required_feature, &mut transcript)?
            }
            ProofRequirements::RequiredQuota { required_quota } => {
                self.prove_quota(secret, *required_quota, &mut transcript)?
            }
            ProofRequirements::RequestedWorkers { requested_workers } => {
                self.prove_workers(secret, *requested_workers, &mut transcript)?
            }
        };

        let proof = ZkProof {
            proof_id: ProofId::new(),
            proof_type: request.proof_type,
            proof: triple,
            public_inputs,
            commitment_id: commitment.commitment_id,
            nonce,
            challenge: request.challenge.clone(),
            verified: false,
        };
        tracing::debug!(
            proof_id = %proof.proof_id,
            proof_type = %proof.proof_type,
            commitment_id = %proof.commitment_id,
            "proof generated"
        );
        Ok(proof)
    }

    /// Schnorr proof of knowledge of the key commitment's opening.
    fn prove_ownership(
        &self,
        secret: &LicenseSecret,
        transcript: &mut Transcript,
    ) -> (ProofTriple, Vec<String>) {
        let proof = OpeningProof::prove(
            &self.gens,
            secret.key_scalar(),
            secret.key_blinding(),
            transcript,
            &mut OsRng,
        );
        (codec::pack_opening(&proof), Vec::new())
    }

    /// Range proof that `tier_rank - minimum >= 0` over the shifted tier
    /// commitment. The verifier recomputes the shift itself, so the proof
    /// binds to the issuer's commitment.
    fn prove_tier(
        &self,
        secret: &LicenseSecret,
        minimum_rank: u64,
        transcript: &mut Transcript,
    ) -> ProtocolResult<(ProofTriple, Vec<String>)> {
        let rank = secret.witness().tier_rank;
        if rank < minimum_rank {
            return Err(ProtocolError::TierBelowMinimum);
        }

        transcript.append_u64(b"minimum-tier", minimum_rank);
        let proof = RangeProof::prove(
            &self.gens,
            rank - minimum_rank,
            secret.tier_blinding(),
            codec::TIER_DIFF_BITS,
            transcript,
            &mut OsRng,
        )?;
        let (triple, bit_commitments) = codec::pack_range(&proof);
        Ok((triple, bit_commitments))
    }

    /// Range proof that `expires_at - reference_time >= 0` over the
    /// shifted expiration commitment.
    fn prove_time_validity(
        &self,
        secret: &LicenseSecret,
        reference_time: i64,
        transcript: &mut Transcript,
    ) -> ProtocolResult<(ProofTriple, Vec<String>)> {
        if reference_time < 0 {
            return Err(ProtocolError::Malformed(
                "negative reference timestamp".to_string(),
            ));
        }
        let expires_at = secret.witness().expires_at;
        if expires_at <= reference_time {
            return Err(ProtocolError::LicenseExpired { expires_at });
        }

        transcript.append_i64(b"current-timestamp", reference_time);
        let proof = RangeProof::prove(
            &self.gens,
            (expires_at - reference_time) as u64,
            secret.expiration_blinding(),
            codec::TIME_DIFF_BITS,
            transcript,
            &mut OsRng,
        )?;
        let (triple, bit_commitments) = codec::pack_range(&proof);
        Ok((triple, bit_commitments))
    }

    /// Merkle inclusion of the feature leaf plus a Schnorr ownership
    /// proof, so a feature proof cannot be replayed by a non-holder.
    fn prove_feature(
        &self,
        secret: &LicenseSecret,
        feature: &str,
        transcript: &mut Transcript,
    ) -> ProtocolResult<(ProofTriple, Vec<String>)> {
        let Some(merkle) = secret.witness().feature_proofs.get(feature) else {
            return Err(ProtocolError::FeatureNotLicensed(feature.to_string()));
        };

        transcript.append(b"required-feature", feature.as_bytes());
        transcript.append(b"merkle-leaf", &merkle.leaf);
        codec::append_merkle_path(transcript, &merkle.path);

        let proof = OpeningProof::prove(
            &self.gens,
            secret.key_scalar(),
            secret.key_blinding(),
            transcript,
            &mut OsRng,
        );
        Ok((codec::pack_opening(&proof), codec::pack_merkle_path(&merkle.path)))
    }

    /// Quota proof: commit to `remaining - required` under a fresh
    /// blinding, range-prove it non-negative, and prove ownership of the
    /// license under the same challenge.
    fn prove_quota(
        &self,
        secret: &LicenseSecret,
        required: u64,
        transcript: &mut Transcript,
    ) -> ProtocolResult<(ProofTriple, Vec<String>)> {
        let remaining = secret.witness().remaining_quota();
        if required > remaining {
            return Err(ProtocolError::InsufficientQuota {
                remaining,
                required,
            });
        }

        transcript.append_u64(b"required-quota", required);
        self.prove_difference(secret, remaining - required, codec::QUOTA_DIFF_BITS, transcript)
    }

    /// Worker proof: same combined shape as the quota proof over
    /// `max_workers - requested`.
    fn prove_workers(
        &self,
        secret: &LicenseSecret,
        requested: u64,
        transcript: &mut Transcript,
    ) -> ProtocolResult<(ProofTriple, Vec<String>)> {
        let max = secret.witness().max_workers;
        if requested > max {
            return Err(ProtocolError::ExceedsWorkerLimit { requested, max });
        }

        transcript.append_u64(b"requested-workers", requested);
        self.prove_difference(secret, max - requested, codec::WORKER_DIFF_BITS, transcript)
    }

    /// AND composition of a Schnorr ownership proof and a range proof over
    /// a fresh difference commitment, sharing one Fiat-Shamir challenge.
    ///
    /// Transcript order (mirrored exactly by the verifier): difference
    /// commitment, bit commitments, Schnorr first message, range first
    /// messages, challenge.
    fn prove_difference(
        &self,
        secret: &LicenseSecret,
        difference: u64,
        n_bits: usize,
        transcript: &mut Transcript,
    ) -> ProtocolResult<(ProofTriple, Vec<String>)> {
        let diff_blinding = Scalar::random(&mut OsRng);
        let diff_commitment = self.gens.commit(Scalar::from(difference), diff_blinding);
        transcript.append_point(b"difference-commitment", diff_commitment.as_compressed());

        let range_prover =
            RangeProver::commit(&self.gens, difference, diff_blinding, n_bits, &mut OsRng)?;
        range_prover.append_bit_commitments(transcript);

        let opening_prover = OpeningProver::commit(&self.gens, &mut OsRng);
        transcript.append_point(b"schnorr-t", opening_prover.first_message());
        range_prover.append_first_messages(transcript);

        let challenge = transcript.challenge_scalar(b"c");
        let opening = opening_prover.finish(challenge, secret.key_scalar(), secret.key_blinding());
        let range = range_prover.finish(challenge);

        let (triple, bit_commitments) = codec::pack_combined(&opening, &range);
        let mut public_inputs = Vec::with_capacity(1 + bit_commitments.len());
        public_inputs.push(diff_commitment.to_hex());
        public_inputs.extend(bit_commitments);
        Ok((triple, public_inputs))
    }

    /// The shared registry handle.
    #[must_use]
    pub fn registry(&self) -> &Arc<CommitmentRegistry> {
        &self.registry
    }

    /// Exposes the generator pair for inspection.
    #[must_use]
    pub fn gens(&self) -> &PedersenGens {
        &self.gens
    }

    /// Helper used by the quota flow: prove, then consume on success.
    pub fn generate_and_consume(
        &self,
        secret: &mut LicenseSecret,
        commitment: &LicenseCommitment,
        request: &ProofRequest,
        units: u64,
    ) -> ProtocolResult<ZkProof> {
        let proof = self.generate(secret, commitment, request)?;
        secret.consume_quota(units)?;
        Ok(proof)
    }
}
