//! Error types for the protocol layer.
//!
//! Three families, mirroring who is responsible for each:
//! - witness violations: the client's secret does not satisfy the
//!   statement; detected before any proof construction
//! - resource violations: rate limiting; detected before any crypto work
//! - request-side errors: expired requests, mismatched requirements
//!
//! Verifier-side protocol violations (missing commitment, bad challenge,
//! malformed proof) are never surfaced as errors from `verify`; they
//! resolve to a well-formed `valid: false` result.

use thiserror::Error;
use veritas_crypto::CryptoError;
use veritas_types::{CommitmentId, ProofType};

/// Protocol-specific errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The license expired before the requested reference time.
    #[error("license expired at {expires_at}")]
    LicenseExpired {
        /// Expiration timestamp (seconds since epoch).
        expires_at: i64,
    },

    /// Remaining quota does not cover the requested units.
    #[error("insufficient quota: {remaining} remaining, {required} required")]
    InsufficientQuota { remaining: u64, required: u64 },

    /// Requested workers exceed the license allocation.
    #[error("worker limit exceeded: {requested} requested, {max} allowed")]
    ExceedsWorkerLimit { requested: u64, max: u64 },

    /// The feature is not in the license's enabled set.
    #[error("feature not licensed: {0}")]
    FeatureNotLicensed(String),

    /// The license tier ranks below the requested minimum.
    #[error("tier rank below requested minimum")]
    TierBelowMinimum,

    /// The hourly proof ceiling for this commitment was reached.
    #[error("rate limit exceeded for commitment {0}")]
    RateLimitExceeded(CommitmentId),

    /// The proof request's challenge window has closed.
    #[error("proof request expired at {0}")]
    RequestExpired(i64),

    /// The requirements union does not parameterize the request's type.
    #[error("requirements do not match proof type {0}")]
    RequirementsMismatch(ProofType),

    /// No commitment registered under this id.
    #[error("commitment not found: {0}")]
    CommitmentNotFound(CommitmentId),

    /// Licenses cannot be issued with a negative expiration timestamp.
    #[error("invalid expiration timestamp: {0}")]
    InvalidExpiration(i64),

    /// A wire field could not be decoded.
    #[error("malformed proof data: {0}")]
    Malformed(String),

    /// Crypto-layer failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
