//! License issuance.
//!
//! The issuer mints the private witness and publishes the matching
//! commitment record. The commitment record is the only artifact that
//! reaches the registry; the secret goes to the client and nowhere else.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha512};
use veritas_crypto::{FeatureTree, PedersenGens};
use veritas_types::{encode_hex, CommitmentId, LicenseCommitment, LicenseTier};

use crate::error::{ProtocolError, ProtocolResult};
use crate::registry::CommitmentRegistry;
use crate::witness::{LicenseSecret, WitnessData};

/// Domain separator for deriving the key scalar from the license key.
const KEY_SCALAR_DOMAIN: &[u8] = b"veritas.license-key.v1";

/// Mints licenses: a private secret for the client, a public commitment
/// record for the registry.
pub struct Issuer {
    gens: PedersenGens,
    registry: Arc<CommitmentRegistry>,
}

impl Issuer {
    /// Creates an issuer publishing into `registry`.
    #[must_use]
    pub fn new(registry: Arc<CommitmentRegistry>) -> Self {
        Self {
            gens: PedersenGens::default(),
            registry,
        }
    }

    /// Derives the committed scalar from a license key string.
    #[must_use]
    pub fn key_scalar(license_key: &str) -> Scalar {
        let mut hasher = Sha512::new();
        hasher.update(KEY_SCALAR_DOMAIN);
        hasher.update(license_key.as_bytes());
        Scalar::from_hash(hasher)
    }

    /// Issues a license of the given tier.
    ///
    /// Returns the client-side secret and the public commitment record;
    /// the record is also registered as a side effect.
    ///
    /// # Errors
    ///
    /// `InvalidExpiration` for a negative timestamp.
    pub fn create_license(
        &self,
        tier: LicenseTier,
        expires_at: i64,
    ) -> ProtocolResult<(LicenseSecret, LicenseCommitment)> {
        if expires_at < 0 {
            return Err(ProtocolError::InvalidExpiration(expires_at));
        }

        let mut key_bytes = [0u8; 16];
        OsRng.fill_bytes(&mut key_bytes);
        let license_key = format!("VER-{}", encode_hex(&key_bytes));
        let key_scalar = Self::key_scalar(&license_key);

        let key_blinding = Scalar::random(&mut OsRng);
        let tier_blinding = Scalar::random(&mut OsRng);
        let expiration_blinding = Scalar::random(&mut OsRng);

        let key_commitment = self.gens.commit(key_scalar, key_blinding);
        let tier_commitment = self.gens.commit(Scalar::from(tier.rank()), tier_blinding);
        let expiration_commitment = self
            .gens
            .commit(Scalar::from(expires_at as u64), expiration_blinding);

        let tree = FeatureTree::build(tier.features())?;
        let mut feature_proofs = BTreeMap::new();
        for feature in tier.features() {
            feature_proofs.insert((*feature).to_string(), tree.prove(feature)?);
        }

        let commitment = LicenseCommitment {
            commitment_id: CommitmentId::new(),
            commitment: key_commitment.to_hex(),
            tier_commitment: tier_commitment.to_hex(),
            expiration_commitment: expiration_commitment.to_hex(),
            feature_merkle_root: encode_hex(&tree.root()),
            verification_key_hash: encode_hex(&self.gens.verification_key_hash()),
            created_at: Utc::now().timestamp(),
        };

        let witness = WitnessData::new(tier, expires_at, feature_proofs);
        let secret = LicenseSecret::new(
            license_key,
            key_scalar,
            key_blinding,
            tier_blinding,
            expiration_blinding,
            witness,
        );

        self.registry.register(commitment.clone());
        tracing::info!(
            commitment_id = %commitment.commitment_id,
            tier = ?tier,
            expires_at,
            "license issued"
        );

        Ok((secret, commitment))
    }

    /// Revokes a previously issued license.
    ///
    /// # Errors
    ///
    /// `CommitmentNotFound` if no license was registered under `id`.
    pub fn revoke_license(&self, id: CommitmentId) -> ProtocolResult<()> {
        self.registry.revoke(id)?;
        tracing::info!(commitment_id = %id, "license revoked");
        Ok(())
    }
}
