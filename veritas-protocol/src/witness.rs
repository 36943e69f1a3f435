//! Private witness data held by the client.
//!
//! `LicenseSecret` never crosses the wire: it has no `Serialize` impl, and
//! the key material zeroizes on drop. The verifier only ever sees the
//! public `LicenseCommitment` and the proofs derived from this witness.

use std::collections::{BTreeMap, BTreeSet};

use curve25519_dalek::scalar::Scalar;
use veritas_crypto::MerkleProof;
use veritas_types::LicenseTier;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ProtocolError, ProtocolResult};

/// The private attribute set proofs are generated from.
///
/// Mutated only by quota consumption; everything else is fixed at issuance.
#[derive(Debug, Clone)]
pub struct WitnessData {
    /// The license tier.
    pub tier: LicenseTier,
    /// Numeric tier rank (committed in the tier commitment).
    pub tier_rank: u64,
    /// Expiration timestamp (seconds since epoch).
    pub expires_at: i64,
    /// Maximum concurrent workers.
    pub max_workers: u64,
    /// Enabled feature names.
    pub features: BTreeSet<String>,
    /// Total usage quota for the billing period.
    pub usage_quota: u64,
    /// Units consumed so far; only ever increases.
    used_quota: u64,
    /// Pre-computed Merkle inclusion proofs, one per enabled feature.
    pub feature_proofs: BTreeMap<String, MerkleProof>,
}

impl WitnessData {
    pub(crate) fn new(
        tier: LicenseTier,
        expires_at: i64,
        feature_proofs: BTreeMap<String, MerkleProof>,
    ) -> Self {
        Self {
            tier,
            tier_rank: tier.rank(),
            expires_at,
            max_workers: tier.max_workers(),
            features: tier.features().iter().map(|f| f.to_string()).collect(),
            usage_quota: tier.usage_quota(),
            used_quota: 0,
            feature_proofs,
        }
    }

    /// Units consumed so far.
    #[must_use]
    pub fn used_quota(&self) -> u64 {
        self.used_quota
    }

    /// Units still available.
    #[must_use]
    pub fn remaining_quota(&self) -> u64 {
        self.usage_quota - self.used_quota
    }

    /// Records quota consumption. `used_quota` is monotonic and may never
    /// exceed `usage_quota`.
    pub fn consume_quota(&mut self, units: u64) -> ProtocolResult<()> {
        let remaining = self.remaining_quota();
        if units > remaining {
            return Err(ProtocolError::InsufficientQuota {
                remaining,
                required: units,
            });
        }
        self.used_quota += units;
        Ok(())
    }

    /// True if the feature is in the enabled set.
    #[must_use]
    pub fn has_feature(&self, name: &str) -> bool {
        self.features.contains(name)
    }
}

/// Zeroized key material backing a license secret.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct SecretMaterial {
    license_key: String,
    key_scalar: Scalar,
    key_blinding: Scalar,
    tier_blinding: Scalar,
    expiration_blinding: Scalar,
}

/// The full private witness: key material plus attribute data.
///
/// Created at issuance, held client-side only, destroyed when the license
/// is revoked or dropped.
#[derive(Clone)]
pub struct LicenseSecret {
    material: SecretMaterial,
    witness: WitnessData,
}

impl LicenseSecret {
    pub(crate) fn new(
        license_key: String,
        key_scalar: Scalar,
        key_blinding: Scalar,
        tier_blinding: Scalar,
        expiration_blinding: Scalar,
        witness: WitnessData,
    ) -> Self {
        Self {
            material: SecretMaterial {
                license_key,
                key_scalar,
                key_blinding,
                tier_blinding,
                expiration_blinding,
            },
            witness,
        }
    }

    /// The raw license key string.
    #[must_use]
    pub fn license_key(&self) -> &str {
        &self.material.license_key
    }

    /// The scalar derived from the license key (committed value).
    #[must_use]
    pub(crate) fn key_scalar(&self) -> Scalar {
        self.material.key_scalar
    }

    /// Blinding factor of the key commitment.
    #[must_use]
    pub(crate) fn key_blinding(&self) -> Scalar {
        self.material.key_blinding
    }

    /// Blinding factor of the tier commitment.
    #[must_use]
    pub(crate) fn tier_blinding(&self) -> Scalar {
        self.material.tier_blinding
    }

    /// Blinding factor of the expiration commitment.
    #[must_use]
    pub(crate) fn expiration_blinding(&self) -> Scalar {
        self.material.expiration_blinding
    }

    /// The private attribute set.
    #[must_use]
    pub fn witness(&self) -> &WitnessData {
        &self.witness
    }

    /// Records quota consumption against the witness.
    pub fn consume_quota(&mut self, units: u64) -> ProtocolResult<()> {
        self.witness.consume_quota(units)
    }
}

impl std::fmt::Debug for LicenseSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseSecret")
            .field("license_key", &"[REDACTED]")
            .field("tier", &self.witness.tier)
            .finish_non_exhaustive()
    }
}
