#![allow(dead_code)]

use std::sync::Arc;

use veritas_protocol::{
    CommitmentRegistry, Issuer, LicenseCommitment, LicenseSecret, LicenseTier, ProofGenerator,
    ProofRequirements, RegistryConfig, VerificationResult, Verifier, ZkProof,
};

/// 2100-01-01, safely past any test clock.
pub const FAR_FUTURE: i64 = 4_102_444_800;

/// One issuer, prover, and verifier wired to a shared registry.
pub struct Harness {
    pub registry: Arc<CommitmentRegistry>,
    pub issuer: Issuer,
    pub prover: ProofGenerator,
    pub verifier: Verifier,
}

pub fn harness() -> Harness {
    harness_with(RegistryConfig::default())
}

pub fn harness_with(config: RegistryConfig) -> Harness {
    let registry = Arc::new(CommitmentRegistry::new(config));
    Harness {
        issuer: Issuer::new(Arc::clone(&registry)),
        prover: ProofGenerator::new(Arc::clone(&registry)),
        verifier: Verifier::new(Arc::clone(&registry)),
        registry,
    }
}

impl Harness {
    pub fn issue(&self, tier: LicenseTier) -> (LicenseSecret, LicenseCommitment) {
        self.issuer
            .create_license(tier, FAR_FUTURE)
            .expect("issuance")
    }

    /// Full request-prove-verify round trip for one statement.
    pub fn round_trip(
        &self,
        secret: &LicenseSecret,
        commitment: &LicenseCommitment,
        requirements: ProofRequirements,
    ) -> (ZkProof, VerificationResult) {
        let request = self.verifier.create_proof_request(requirements);
        let proof = self
            .prover
            .generate(secret, commitment, &request)
            .expect("proof generation");
        let result = self.verifier.verify(&proof);
        (proof, result)
    }
}
