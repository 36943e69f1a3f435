//! Merkle tree over a tier's enabled feature set.
//!
//! Built once per tier from the ordered feature list: leaves are
//! domain-tagged SHA-256 hashes of feature names, internal nodes hash
//! `left ‖ right`, and odd levels duplicate the last node. Leaf and node
//! hashes use distinct domain tags so an internal node can never be
//! reinterpreted as a leaf.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::error::{CryptoError, CryptoResult};

const LEAF_DOMAIN: &[u8] = b"veritas.merkle.leaf.v1";
const NODE_DOMAIN: &[u8] = b"veritas.merkle.node.v1";

/// Hashes a feature name into a leaf.
#[must_use]
pub fn feature_leaf_hash(name: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(LEAF_DOMAIN);
    hasher.update(name.as_bytes());
    hasher.finalize().into()
}

fn node_hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(NODE_DOMAIN);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// One step of a Merkle path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleStep {
    /// The sibling hash at this level.
    pub sibling: [u8; 32],
    /// True when the sibling sits to the left of the running hash.
    pub sibling_on_left: bool,
}

/// An inclusion proof: a leaf plus its sibling path to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// The leaf hash being proven.
    pub leaf: [u8; 32],
    /// Sibling path, leaf level first.
    pub path: Vec<MerkleStep>,
}

impl MerkleProof {
    /// Recomputes the root by folding the path in the indicated order and
    /// compares it to `root`.
    #[must_use]
    pub fn verify(&self, root: &[u8; 32]) -> bool {
        let mut current = self.leaf;
        for step in &self.path {
            current = if step.sibling_on_left {
                node_hash(&step.sibling, &current)
            } else {
                node_hash(&current, &step.sibling)
            };
        }
        current == *root
    }
}

/// An append-only binary hash tree over an ordered feature list.
#[derive(Debug, Clone)]
pub struct FeatureTree {
    /// Every level, leaf level first, including duplicate padding nodes.
    levels: Vec<Vec<[u8; 32]>>,
    /// Feature name to leaf index.
    index: BTreeMap<String, usize>,
}

impl FeatureTree {
    /// Builds a tree from an ordered feature list.
    ///
    /// # Errors
    ///
    /// `EmptyFeatureSet` when `features` is empty.
    pub fn build<S: AsRef<str>>(features: &[S]) -> CryptoResult<Self> {
        if features.is_empty() {
            return Err(CryptoError::EmptyFeatureSet);
        }

        let mut index = BTreeMap::new();
        for (i, feature) in features.iter().enumerate() {
            index.entry(feature.as_ref().to_string()).or_insert(i);
        }

        let mut levels = Vec::new();
        let mut current: Vec<[u8; 32]> = features
            .iter()
            .map(|f| feature_leaf_hash(f.as_ref()))
            .collect();

        while current.len() > 1 {
            if current.len() % 2 == 1 {
                if let Some(&last) = current.last() {
                    current.push(last);
                }
            }
            let next = current
                .chunks(2)
                .map(|pair| node_hash(&pair[0], &pair[1]))
                .collect();
            levels.push(current);
            current = next;
        }
        levels.push(current);

        Ok(Self { levels, index })
    }

    /// The tree root.
    #[must_use]
    pub fn root(&self) -> [u8; 32] {
        self.levels[self.levels.len() - 1][0]
    }

    /// Produces an inclusion proof for a feature.
    ///
    /// # Errors
    ///
    /// `UnknownFeature` when the feature is not a leaf of this tree.
    pub fn prove(&self, feature: &str) -> CryptoResult<MerkleProof> {
        let mut idx = *self
            .index
            .get(feature)
            .ok_or_else(|| CryptoError::UnknownFeature(feature.to_string()))?;

        let leaf = self.levels[0][idx];
        let mut path = Vec::with_capacity(self.levels.len() - 1);

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_on_left = idx % 2 == 1;
            let sibling_idx = if sibling_on_left { idx - 1 } else { idx + 1 };
            path.push(MerkleStep {
                sibling: level[sibling_idx],
                sibling_on_left,
            });
            idx /= 2;
        }

        Ok(MerkleProof { leaf, path })
    }
}
