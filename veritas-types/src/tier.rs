//! License tiers and their entitlement tables.
//!
//! Each tier carries an ordered, append-only feature list (the Merkle tree
//! over a tier's features depends on this order), a worker ceiling, and a
//! usage quota.

use crate::Error;
use serde::{Deserialize, Serialize};

/// The license tier (ordered by rank).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseTier {
    /// Free tier (rank 0).
    Free,
    /// Starter tier (rank 1).
    Starter,
    /// Growth tier (rank 2).
    Growth,
    /// Professional tier (rank 3).
    Professional,
    /// Enterprise tier (rank 4).
    Enterprise,
}

impl LicenseTier {
    /// Returns the numeric rank used in tier-membership proofs.
    #[must_use]
    pub fn rank(&self) -> u64 {
        match self {
            Self::Free => 0,
            Self::Starter => 1,
            Self::Growth => 2,
            Self::Professional => 3,
            Self::Enterprise => 4,
        }
    }

    /// Looks a tier up by rank.
    pub fn from_rank(rank: u64) -> Result<Self, Error> {
        match rank {
            0 => Ok(Self::Free),
            1 => Ok(Self::Starter),
            2 => Ok(Self::Growth),
            3 => Ok(Self::Professional),
            4 => Ok(Self::Enterprise),
            other => Err(Error::UnknownTierRank(other)),
        }
    }

    /// Returns the ordered feature list enabled for this tier.
    ///
    /// The order is append-only: higher tiers extend lower tiers without
    /// reordering, so feature Merkle roots stay stable per tier.
    #[must_use]
    pub fn features(&self) -> &'static [&'static str] {
        match self {
            Self::Free => &["core"],
            Self::Starter => &["core", "export"],
            Self::Growth => &["core", "export", "api-access", "priority-queue"],
            Self::Professional => &[
                "core",
                "export",
                "api-access",
                "priority-queue",
                "bulk-operations",
                "webhooks",
            ],
            Self::Enterprise => &[
                "core",
                "export",
                "api-access",
                "priority-queue",
                "bulk-operations",
                "webhooks",
                "sso",
            ],
        }
    }

    /// Returns the maximum number of concurrent workers for this tier.
    #[must_use]
    pub fn max_workers(&self) -> u64 {
        match self {
            Self::Free => 1,
            Self::Starter => 2,
            Self::Growth => 4,
            Self::Professional => 8,
            Self::Enterprise => 32,
        }
    }

    /// Returns the usage quota (units per billing period) for this tier.
    #[must_use]
    pub fn usage_quota(&self) -> u64 {
        match self {
            Self::Free => 100,
            Self::Starter => 1_000,
            Self::Growth => 10_000,
            Self::Professional => 100_000,
            Self::Enterprise => 1_000_000,
        }
    }
}
