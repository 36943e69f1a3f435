//! Protocol state machines for the Veritas license proof system.
//!
//! Four actors share one explicit [`CommitmentRegistry`]:
//!
//! - [`Issuer`] mints licenses: a private [`LicenseSecret`] for the client
//!   and a public `LicenseCommitment` record for the registry
//! - [`Verifier::create_proof_request`] issues single-use challenges
//! - [`ProofGenerator`] answers requests with zero-knowledge proofs
//! - [`Verifier::verify`] checks them, returning `valid: false` with a
//!   reason on any protocol violation rather than an error
//!
//! The client-side error taxonomy is typed: a prover holding a witness
//! that does not satisfy the statement gets a [`ProtocolError`] naming the
//! violation, and no proof is ever constructed over a false statement.

mod codec;
mod error;
mod issuer;
mod prover;
mod registry;
mod verifier;
mod witness;

pub use error::{ProtocolError, ProtocolResult};
pub use issuer::Issuer;
pub use prover::ProofGenerator;
pub use registry::{ChallengeStatus, CommitmentRegistry, RegistryConfig};
pub use verifier::Verifier;
pub use witness::{LicenseSecret, WitnessData};

// Re-exported so protocol users rarely need the types crate directly.
pub use veritas_types::{
    CommitmentId, LicenseCommitment, LicenseTier, ProofId, ProofRequest, ProofRequirements,
    ProofTriple, ProofType, ProvenClaims, RequestId, VerificationResult, ZkProof,
};
