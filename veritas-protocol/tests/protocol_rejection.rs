mod common;

use common::{harness, harness_with};
use veritas_protocol::{
    LicenseTier, ProofId, ProofRequirements, ProofType, ProtocolError, RegistryConfig,
};

/// Flips one nibble of a hex string.
fn corrupt(hex_str: &str, at: usize) -> String {
    let mut chars: Vec<char> = hex_str.chars().collect();
    chars[at] = if chars[at] == '0' { '1' } else { '0' };
    chars.into_iter().collect()
}

#[test]
fn tampered_first_message_rejected() {
    let h = harness();
    let (secret, commitment) = h.issue(LicenseTier::Starter);
    let request = h
        .verifier
        .create_proof_request(ProofRequirements::LicenseOwnership {});
    let mut proof = h.prover.generate(&secret, &commitment, &request).unwrap();

    proof.proof.a = corrupt(&proof.proof.a, 10);
    assert!(!h.verifier.verify(&proof).valid);
}

#[test]
fn tampered_response_rejected() {
    let h = harness();
    let (secret, commitment) = h.issue(LicenseTier::Starter);
    let request = h
        .verifier
        .create_proof_request(ProofRequirements::LicenseOwnership {});
    let mut proof = h.prover.generate(&secret, &commitment, &request).unwrap();

    proof.proof.b = corrupt(&proof.proof.b, 0);
    assert!(!h.verifier.verify(&proof).valid);
}

#[test]
fn tampered_challenge_rejected() {
    let h = harness();
    let (secret, commitment) = h.issue(LicenseTier::Enterprise);
    let request = h.verifier.create_proof_request(ProofRequirements::MinimumTier {
        minimum_tier: LicenseTier::Growth,
    });
    let mut proof = h.prover.generate(&secret, &commitment, &request).unwrap();

    proof.proof.c = corrupt(&proof.proof.c, 4);
    assert!(!h.verifier.verify(&proof).valid);
}

#[test]
fn tampered_public_input_rejected() {
    let h = harness();
    let (secret, commitment) = h.issue(LicenseTier::Growth);
    let request = h.verifier.create_proof_request(ProofRequirements::RequiredQuota {
        required_quota: 100,
    });
    let mut proof = h.prover.generate(&secret, &commitment, &request).unwrap();

    // The difference commitment is the first public input.
    proof.public_inputs[0] = corrupt(&proof.public_inputs[0], 2);
    assert!(!h.verifier.verify(&proof).valid);
}

#[test]
fn replayed_challenge_rejected_for_a_different_proof() {
    let h = harness();
    let (secret, commitment) = h.issue(LicenseTier::Free);
    let request = h
        .verifier
        .create_proof_request(ProofRequirements::LicenseOwnership {});
    let proof = h.prover.generate(&secret, &commitment, &request).unwrap();

    assert!(h.verifier.verify(&proof).valid);

    // A second proof reusing the consumed challenge is rejected, even
    // though its algebra would check out.
    let mut replay = h.prover.generate(&secret, &commitment, &request).unwrap();
    replay.challenge = proof.challenge.clone();
    let result = h.verifier.verify(&replay);
    assert!(!result.valid);
    assert_eq!(result.reason.as_deref(), Some("challenge already consumed"));
}

#[test]
fn stolen_proof_id_does_not_unlock_the_cache() {
    let h = harness();
    let (secret, commitment) = h.issue(LicenseTier::Free);
    let request = h
        .verifier
        .create_proof_request(ProofRequirements::LicenseOwnership {});
    let proof = h.prover.generate(&secret, &commitment, &request).unwrap();
    assert!(h.verifier.verify(&proof).valid);

    let mut forged = proof.clone();
    forged.proof_id = ProofId::new();
    assert!(!h.verifier.verify(&forged).valid);
}

#[test]
fn unknown_challenge_rejected() {
    let h = harness();
    let (secret, commitment) = h.issue(LicenseTier::Free);
    let request = h
        .verifier
        .create_proof_request(ProofRequirements::LicenseOwnership {});
    let mut proof = h.prover.generate(&secret, &commitment, &request).unwrap();

    proof.challenge = "00".repeat(32);
    let result = h.verifier.verify(&proof);
    assert!(!result.valid);
    assert_eq!(result.reason.as_deref(), Some("unknown challenge"));
}

#[test]
fn proof_type_must_match_the_request() {
    let h = harness();
    let (secret, commitment) = h.issue(LicenseTier::Enterprise);
    let request = h.verifier.create_proof_request(ProofRequirements::MinimumTier {
        minimum_tier: LicenseTier::Free,
    });
    let mut proof = h.prover.generate(&secret, &commitment, &request).unwrap();

    proof.proof_type = ProofType::LicenseOwnership;
    let result = h.verifier.verify(&proof);
    assert!(!result.valid);
    assert_eq!(
        result.reason.as_deref(),
        Some("proof type does not match request")
    );
}

#[test]
fn proof_cannot_be_rebound_to_another_license() {
    let h = harness();
    let (secret_a, commitment_a) = h.issue(LicenseTier::Enterprise);
    let (_secret_b, commitment_b) = h.issue(LicenseTier::Enterprise);

    let request = h
        .verifier
        .create_proof_request(ProofRequirements::LicenseOwnership {});
    let mut proof = h
        .prover
        .generate(&secret_a, &commitment_a, &request)
        .unwrap();

    // Rebinding the proof to the other registered license breaks the
    // transcript binding.
    proof.commitment_id = commitment_b.commitment_id;
    assert!(!h.verifier.verify(&proof).valid);
}

#[test]
fn rate_limit_blocks_the_next_proof() {
    let h = harness_with(RegistryConfig {
        rate_limit_per_window: 3,
        ..RegistryConfig::default()
    });
    let (secret, commitment) = h.issue(LicenseTier::Free);

    for _ in 0..3 {
        let request = h
            .verifier
            .create_proof_request(ProofRequirements::LicenseOwnership {});
        h.prover.generate(&secret, &commitment, &request).unwrap();
    }

    let request = h
        .verifier
        .create_proof_request(ProofRequirements::LicenseOwnership {});
    assert!(matches!(
        h.prover.generate(&secret, &commitment, &request),
        Err(ProtocolError::RateLimitExceeded(id)) if id == commitment.commitment_id
    ));
}

#[test]
fn revocation_blocks_future_verifications() {
    let h = harness();
    let (secret, commitment) = h.issue(LicenseTier::Professional);

    let request = h.verifier.create_proof_request(ProofRequirements::RequiredFeature {
        required_feature: "bulk-operations".to_string(),
    });
    let proof = h.prover.generate(&secret, &commitment, &request).unwrap();

    assert!(h.issuer.revoke_license(commitment.commitment_id).is_ok());
    let result = h.verifier.verify(&proof);
    assert!(!result.valid);
    assert_eq!(result.reason.as_deref(), Some("commitment revoked"));
}

#[test]
fn merkle_path_for_a_different_feature_rejected() {
    let h = harness();
    let (secret, commitment) = h.issue(LicenseTier::Professional);

    let request = h.verifier.create_proof_request(ProofRequirements::RequiredFeature {
        required_feature: "export".to_string(),
    });
    let mut proof = h.prover.generate(&secret, &commitment, &request).unwrap();

    // Substitute the path of a sibling feature. The verifier re-derives
    // the leaf from the requested name, so the borrowed path cannot fold
    // to the committed root.
    let other_request = h.verifier.create_proof_request(ProofRequirements::RequiredFeature {
        required_feature: "core".to_string(),
    });
    let other = h
        .prover
        .generate(&secret, &commitment, &other_request)
        .unwrap();
    proof.public_inputs = other.public_inputs;

    let result = h.verifier.verify(&proof);
    assert!(!result.valid);
    assert_eq!(result.reason.as_deref(), Some("feature not in committed set"));
}

#[test]
fn truncated_proof_fields_rejected_not_errored() {
    let h = harness();
    let (secret, commitment) = h.issue(LicenseTier::Free);
    let request = h
        .verifier
        .create_proof_request(ProofRequirements::LicenseOwnership {});
    let mut proof = h.prover.generate(&secret, &commitment, &request).unwrap();

    proof.proof.b.truncate(10);
    let result = h.verifier.verify(&proof);
    assert!(!result.valid);
    assert!(result.reason.is_some());
}
