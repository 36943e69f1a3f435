//! Proof types and the per-type requirement union.

use crate::LicenseTier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six statements a client can prove about its license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProofType {
    /// "I know the opening of the license commitment."
    LicenseOwnership,
    /// "My tier rank is at least the requested minimum."
    TierMembership,
    /// "Feature F is in my enabled feature set."
    FeatureAccess,
    /// "My remaining quota covers the requested units."
    UsageQuota,
    /// "My license has not expired."
    TimeValidity,
    /// "My requested worker count fits my allocation."
    WorkerAllocation,
}

impl ProofType {
    /// Returns the wire name of the proof type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LicenseOwnership => "license-ownership",
            Self::TierMembership => "tier-membership",
            Self::FeatureAccess => "feature-access",
            Self::UsageQuota => "usage-quota",
            Self::TimeValidity => "time-validity",
            Self::WorkerAllocation => "worker-allocation",
        }
    }
}

impl fmt::Display for ProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the verifier is asking for, keyed by proof type.
///
/// Serialized untagged: each variant has a distinct field set, matching the
/// wire `requirements` union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProofRequirements {
    /// Minimum tier for a tier-membership proof.
    MinimumTier {
        #[serde(rename = "minimumTier")]
        minimum_tier: LicenseTier,
    },
    /// Feature name for a feature-access proof.
    RequiredFeature {
        #[serde(rename = "requiredFeature")]
        required_feature: String,
    },
    /// Units required for a usage-quota proof.
    RequiredQuota {
        #[serde(rename = "requiredQuota")]
        required_quota: u64,
    },
    /// Worker count for a worker-allocation proof.
    RequestedWorkers {
        #[serde(rename = "requestedWorkers")]
        requested_workers: u64,
    },
    /// Verifier-supplied reference time for a time-validity proof
    /// (seconds since epoch).
    CurrentTimestamp {
        #[serde(rename = "currentTimestamp")]
        current_timestamp: i64,
    },
    /// No parameters: license-ownership.
    LicenseOwnership {},
}

impl ProofRequirements {
    /// Returns the proof type these requirements parameterize.
    #[must_use]
    pub fn proof_type(&self) -> ProofType {
        match self {
            Self::LicenseOwnership {} => ProofType::LicenseOwnership,
            Self::MinimumTier { .. } => ProofType::TierMembership,
            Self::RequiredFeature { .. } => ProofType::FeatureAccess,
            Self::RequiredQuota { .. } => ProofType::UsageQuota,
            Self::CurrentTimestamp { .. } => ProofType::TimeValidity,
            Self::RequestedWorkers { .. } => ProofType::WorkerAllocation,
        }
    }

    /// Returns true if these requirements match the given proof type.
    #[must_use]
    pub fn matches(&self, proof_type: ProofType) -> bool {
        self.proof_type() == proof_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_type_wire_names_are_kebab_case() {
        let json = serde_json::to_string(&ProofType::TierMembership).unwrap();
        assert_eq!(json, "\"tier-membership\"");
        let back: ProofType = serde_json::from_str("\"usage-quota\"").unwrap();
        assert_eq!(back, ProofType::UsageQuota);
    }

    #[test]
    fn requirements_map_to_their_proof_type() {
        let req = ProofRequirements::MinimumTier {
            minimum_tier: LicenseTier::Professional,
        };
        assert!(req.matches(ProofType::TierMembership));
        assert!(!req.matches(ProofType::UsageQuota));
    }

    #[test]
    fn requirements_serialize_with_wire_field_names() {
        let req = ProofRequirements::RequiredQuota { required_quota: 50 };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, "{\"requiredQuota\":50}");

        let back: ProofRequirements = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
