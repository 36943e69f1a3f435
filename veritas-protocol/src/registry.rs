//! Commitment registry, rate limiter, challenge bookkeeping, and
//! verification cache.
//!
//! One explicit shared handle: issuer, prover, and verifier each hold an
//! `Arc<CommitmentRegistry>`; there is no process-global state. All maps
//! live behind a single mutex so that rate-limit check-and-increment and
//! challenge consumption are atomic: a burst of concurrent calls against
//! one commitment id cannot slip past the hourly ceiling or consume one
//! challenge twice. Mutating entry points sweep expired entries under
//! the same lock, keeping the maps bounded under request floods.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use veritas_types::{CommitmentId, LicenseCommitment, ProofId, ProofRequest, VerificationResult};

use crate::error::{ProtocolError, ProtocolResult};

/// Tunables for the registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum proofs per commitment per rolling window.
    pub rate_limit_per_window: u32,
    /// Rolling window length in seconds.
    pub rate_window_secs: i64,
    /// Verification-cache TTL in seconds.
    pub cache_ttl_secs: i64,
    /// Proof-request challenge window in seconds.
    pub request_ttl_secs: i64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_window: 1_000,
            rate_window_secs: 3_600,
            cache_ttl_secs: 60,
            request_ttl_secs: 300,
        }
    }
}

/// Outcome of presenting a challenge for consumption.
#[derive(Debug, Clone)]
pub enum ChallengeStatus {
    /// The challenge was pending and unexpired; it is now consumed by the
    /// presenting proof.
    Fresh(ProofRequest),
    /// The challenge was already consumed. Carries the original request
    /// so the consuming proof itself can be re-verified after its cached
    /// result has gone stale.
    AlreadyConsumed {
        /// The proof that consumed it.
        by: ProofId,
        /// The request the challenge was issued under.
        request: ProofRequest,
    },
    /// The challenge existed but its request window has closed.
    Expired,
    /// No request ever carried this challenge.
    Unknown,
}

struct RateWindow {
    window_start: i64,
    count: u32,
}

struct ConsumedChallenge {
    by: ProofId,
    request: ProofRequest,
    retain_until: i64,
}

struct CachedVerification {
    result: VerificationResult,
    expires_at: i64,
}

struct Inner {
    commitments: HashMap<CommitmentId, LicenseCommitment>,
    revoked: HashSet<CommitmentId>,
    pending: HashMap<String, ProofRequest>,
    consumed: HashMap<String, ConsumedChallenge>,
    rate: HashMap<CommitmentId, RateWindow>,
    cache: HashMap<ProofId, CachedVerification>,
    last_sweep: i64,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            commitments: HashMap::new(),
            revoked: HashSet::new(),
            pending: HashMap::new(),
            consumed: HashMap::new(),
            rate: HashMap::new(),
            cache: HashMap::new(),
            last_sweep: i64::MIN,
        }
    }
}

/// Shared protocol state: commitments, challenges, counters, cache.
pub struct CommitmentRegistry {
    config: RegistryConfig,
    inner: Mutex<Inner>,
}

impl CommitmentRegistry {
    /// Creates a registry with the given configuration.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Stores a published commitment. Commitments are immutable; a second
    /// registration under the same id is ignored.
    pub fn register(&self, commitment: LicenseCommitment) {
        let mut inner = self.inner.lock();
        inner
            .commitments
            .entry(commitment.commitment_id)
            .or_insert(commitment);
    }

    /// Looks a commitment up by id.
    #[must_use]
    pub fn get(&self, id: CommitmentId) -> Option<LicenseCommitment> {
        self.inner.lock().commitments.get(&id).cloned()
    }

    /// Adds a commitment id to the revocation set.
    ///
    /// # Errors
    ///
    /// `CommitmentNotFound` if the id was never registered.
    pub fn revoke(&self, id: CommitmentId) -> ProtocolResult<()> {
        let mut inner = self.inner.lock();
        if !inner.commitments.contains_key(&id) {
            return Err(ProtocolError::CommitmentNotFound(id));
        }
        inner.revoked.insert(id);
        Ok(())
    }

    /// True if the commitment has been revoked.
    #[must_use]
    pub fn is_revoked(&self, id: CommitmentId) -> bool {
        self.inner.lock().revoked.contains(&id)
    }

    /// Stores a freshly issued proof request, keyed by its challenge.
    pub fn insert_request(&self, request: ProofRequest, now: i64) {
        let mut inner = self.inner.lock();
        inner.pending.insert(request.challenge.clone(), request);
        self.sweep_expired(&mut inner, now);
    }

    /// Presents a challenge for consumption by `proof_id`.
    ///
    /// Single lock acquisition: lookup, expiry check, and the
    /// pending-to-consumed transition are atomic.
    pub fn consume_challenge(
        &self,
        challenge: &str,
        proof_id: ProofId,
        now: i64,
    ) -> ChallengeStatus {
        let mut inner = self.inner.lock();

        let status = match inner.consumed.get(challenge) {
            Some(record) if now < record.retain_until => ChallengeStatus::AlreadyConsumed {
                by: record.by,
                request: record.request.clone(),
            },
            _ => match inner.pending.remove(challenge) {
                Some(request) if now < request.expires_at => {
                    // Retained past the request window so the consuming
                    // proof stays re-verifiable while its cached result
                    // could still be live.
                    let retain_until =
                        request.expires_at.max(now + self.config.cache_ttl_secs);
                    inner.consumed.insert(
                        challenge.to_string(),
                        ConsumedChallenge {
                            by: proof_id,
                            request: request.clone(),
                            retain_until,
                        },
                    );
                    ChallengeStatus::Fresh(request)
                }
                Some(_) => ChallengeStatus::Expired,
                None => ChallengeStatus::Unknown,
            },
        };

        self.sweep_expired(&mut inner, now);
        status
    }

    /// Checks and increments the proof counter for a commitment in one
    /// atomic step. Fails with `RateLimitExceeded` at the ceiling; the
    /// counter resets when the rolling window elapses.
    pub fn check_rate_limit(&self, id: CommitmentId, now: i64) -> ProtocolResult<()> {
        let mut inner = self.inner.lock();
        let window = inner.rate.entry(id).or_insert(RateWindow {
            window_start: now,
            count: 0,
        });

        if now - window.window_start >= self.config.rate_window_secs {
            window.window_start = now;
            window.count = 0;
        }

        if window.count >= self.config.rate_limit_per_window {
            return Err(ProtocolError::RateLimitExceeded(id));
        }
        window.count += 1;
        Ok(())
    }

    /// Current proof count in the active window (diagnostics/tests).
    #[must_use]
    pub fn proof_count(&self, id: CommitmentId) -> u32 {
        self.inner.lock().rate.get(&id).map_or(0, |w| w.count)
    }

    /// Caches a verification result under its proof id.
    pub fn cache_result(&self, result: VerificationResult, now: i64) {
        let mut inner = self.inner.lock();
        inner.cache.insert(
            result.proof_id,
            CachedVerification {
                expires_at: now + self.config.cache_ttl_secs,
                result,
            },
        );
        self.sweep_expired(&mut inner, now);
    }

    /// Returns a cached result if present and unexpired. Expiry is
    /// advisory: a stale entry is simply a miss, since re-verification is
    /// idempotent.
    #[must_use]
    pub fn cached_result(&self, proof_id: ProofId, now: i64) -> Option<VerificationResult> {
        let inner = self.inner.lock();
        inner
            .cache
            .get(&proof_id)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.result.clone())
    }

    /// Pending proof requests currently held (diagnostics/tests).
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Consumed-challenge records currently retained (diagnostics/tests).
    #[must_use]
    pub fn consumed_count(&self) -> usize {
        self.inner.lock().consumed.len()
    }

    /// Verification-cache entries currently held (diagnostics/tests).
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.inner.lock().cache.len()
    }

    /// Drops expired requests, stale consumed records, dead cache
    /// entries, and idle rate windows. Runs inside the caller's lock on
    /// every mutating entry point, at most once per second, so the maps
    /// stay bounded under sustained unauthenticated request traffic.
    fn sweep_expired(&self, inner: &mut Inner, now: i64) {
        if now == inner.last_sweep {
            return;
        }
        inner.last_sweep = now;

        inner.pending.retain(|_, request| now < request.expires_at);
        inner.consumed.retain(|_, record| now < record.retain_until);
        inner.cache.retain(|_, entry| now < entry.expires_at);
        let window = self.config.rate_window_secs;
        inner.rate.retain(|_, w| now - w.window_start < window);
    }
}

impl Default for CommitmentRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_types::{ProofRequirements, ProofType, ProvenClaims, RequestId};

    fn request(challenge: &str, expires_at: i64) -> ProofRequest {
        ProofRequest {
            request_id: RequestId::new(),
            proof_type: ProofType::LicenseOwnership,
            requirements: ProofRequirements::LicenseOwnership {},
            challenge: challenge.to_string(),
            expires_at,
        }
    }

    fn verification(proof_id: ProofId) -> VerificationResult {
        VerificationResult {
            valid: true,
            proof_id,
            verified_at: 0,
            proven_claims: ProvenClaims::for_type(ProofType::LicenseOwnership),
            verification_time_micros: 1,
            reason: None,
        }
    }

    #[test]
    fn challenge_is_single_use() {
        let registry = CommitmentRegistry::default();
        registry.insert_request(request("abc", 1_000), 0);

        let p1 = ProofId::new();
        let p2 = ProofId::new();
        assert!(matches!(
            registry.consume_challenge("abc", p1, 500),
            ChallengeStatus::Fresh(_)
        ));
        match registry.consume_challenge("abc", p2, 500) {
            ChallengeStatus::AlreadyConsumed { by, .. } => assert_eq!(by, p1),
            other => panic!("expected AlreadyConsumed, got {other:?}"),
        }
    }

    #[test]
    fn expired_challenge_rejected() {
        let registry = CommitmentRegistry::default();
        registry.insert_request(request("abc", 1_000), 0);
        assert!(matches!(
            registry.consume_challenge("abc", ProofId::new(), 1_000),
            ChallengeStatus::Expired
        ));
    }

    #[test]
    fn unknown_challenge_rejected() {
        let registry = CommitmentRegistry::default();
        assert!(matches!(
            registry.consume_challenge("nope", ProofId::new(), 0),
            ChallengeStatus::Unknown
        ));
    }

    #[test]
    fn rate_window_resets() {
        let config = RegistryConfig {
            rate_limit_per_window: 2,
            rate_window_secs: 3_600,
            ..RegistryConfig::default()
        };
        let registry = CommitmentRegistry::new(config);
        let id = CommitmentId::new();

        assert!(registry.check_rate_limit(id, 0).is_ok());
        assert!(registry.check_rate_limit(id, 1).is_ok());
        assert!(matches!(
            registry.check_rate_limit(id, 2),
            Err(ProtocolError::RateLimitExceeded(_))
        ));
        // The rolling window elapses and the counter resets.
        assert!(registry.check_rate_limit(id, 3_600).is_ok());
        assert_eq!(registry.proof_count(id), 1);
    }

    #[test]
    fn default_ceiling_rejects_the_1001st_proof() {
        let registry = CommitmentRegistry::default();
        let id = CommitmentId::new();
        for i in 0..1_000 {
            assert!(registry.check_rate_limit(id, i).is_ok());
        }
        assert!(matches!(
            registry.check_rate_limit(id, 1_000),
            Err(ProtocolError::RateLimitExceeded(_))
        ));
    }

    #[test]
    fn revoke_requires_known_commitment() {
        let registry = CommitmentRegistry::default();
        assert!(matches!(
            registry.revoke(CommitmentId::new()),
            Err(ProtocolError::CommitmentNotFound(_))
        ));
    }

    #[test]
    fn expired_requests_are_swept_on_later_traffic() {
        let registry = CommitmentRegistry::default();
        for i in 0..100 {
            registry.insert_request(request(&format!("c{i}"), 1), 0);
        }
        assert_eq!(registry.pending_count(), 100);

        // Presenting one long after expiry sweeps the other ninety-nine.
        assert!(matches!(
            registry.consume_challenge("c0", ProofId::new(), 1_000_000),
            ChallengeStatus::Expired
        ));
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn consumed_records_are_swept_after_retention() {
        let registry = CommitmentRegistry::default();
        registry.insert_request(request("abc", 1_000), 0);
        let p1 = ProofId::new();
        assert!(matches!(
            registry.consume_challenge("abc", p1, 0),
            ChallengeStatus::Fresh(_)
        ));
        assert_eq!(registry.consumed_count(), 1);

        // Retention runs to the request expiry here; well past it, the
        // record no longer answers and the sweep drops it.
        assert!(matches!(
            registry.consume_challenge("abc", p1, 2_000),
            ChallengeStatus::Unknown
        ));
        assert_eq!(registry.consumed_count(), 0);
    }

    #[test]
    fn stale_cache_entry_is_a_miss() {
        let registry = CommitmentRegistry::default();
        let result = verification(ProofId::new());
        registry.cache_result(result.clone(), 0);

        assert!(registry.cached_result(result.proof_id, 59).is_some());
        assert!(registry.cached_result(result.proof_id, 60).is_none());
    }

    #[test]
    fn dead_cache_entries_are_swept() {
        let registry = CommitmentRegistry::default();
        registry.cache_result(verification(ProofId::new()), 0);
        assert_eq!(registry.cached_count(), 1);

        // A later write triggers the sweep of the expired entry.
        registry.cache_result(verification(ProofId::new()), 100);
        assert_eq!(registry.cached_count(), 1);
    }
}
