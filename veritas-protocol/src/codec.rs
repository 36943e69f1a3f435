//! Wire packing for proofs and the shared Fiat-Shamir base transcript.
//!
//! The proof triple `{a, b, c}` carries concatenated fixed-width fields:
//!
//! - opening proof: `a = T` (32 bytes), `b = s1 ‖ s2` (64), `c` the
//!   challenge scalar (32)
//! - range proof: `a = T0_0 ‖ T1_0 ‖ …` (64 per bit),
//!   `b = c0_0 ‖ s0_0 ‖ s1_0 ‖ …` (96 per bit), bit commitments travel in
//!   `publicInputs`
//! - combined (opening AND range under one challenge): the opening fields
//!   precede the range fields in both `a` and `b`
//!
//! Both sides must rebuild the transcript in the exact same order; every
//! function here is used by the prover and the verifier so the two cannot
//! drift.

use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::scalar::Scalar;
use veritas_crypto::{
    BitProof, Commitment, MerkleStep, OpeningProof, RangeProof, Transcript,
};
use veritas_types::{
    decode_array32, decode_hex, encode_hex, LicenseCommitment, ProofTriple, ProofType,
};

use crate::error::{ProtocolError, ProtocolResult};

/// Domain tag for the proof transcript.
const PROOF_DOMAIN: &[u8] = b"veritas.proof.v1";

/// Range-proof bit widths per statement. Tier ranks fit a byte; quota and
/// worker differences fit 32 bits; expiration differences are seconds and
/// get 40 bits of headroom.
pub(crate) const TIER_DIFF_BITS: usize = 8;
pub(crate) const QUOTA_DIFF_BITS: usize = 32;
pub(crate) const WORKER_DIFF_BITS: usize = 32;
pub(crate) const TIME_DIFF_BITS: usize = 40;

/// Builds the transcript prefix shared by every proof type: the full
/// public context of the statement, absorbed before any per-type data.
pub(crate) fn base_transcript(
    commitment: &LicenseCommitment,
    proof_type: ProofType,
    challenge_hex: &str,
    nonce_hex: &str,
) -> ProtocolResult<Transcript> {
    let key = Commitment::from_hex(&commitment.commitment)?;
    let tier = Commitment::from_hex(&commitment.tier_commitment)?;
    let expiration = Commitment::from_hex(&commitment.expiration_commitment)?;
    let root = decode_array32(&commitment.feature_merkle_root)
        .map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    let vk_hash = decode_array32(&commitment.verification_key_hash)
        .map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    let challenge =
        decode_hex(challenge_hex).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    let nonce = decode_hex(nonce_hex).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    let mut transcript = Transcript::new(PROOF_DOMAIN);
    transcript.append(b"commitment-id", commitment.commitment_id.to_string().as_bytes());
    transcript.append_point(b"key-commitment", key.as_compressed());
    transcript.append_point(b"tier-commitment", tier.as_compressed());
    transcript.append_point(b"expiration-commitment", expiration.as_compressed());
    transcript.append(b"feature-merkle-root", &root);
    transcript.append(b"verification-key-hash", &vk_hash);
    transcript.append(b"proof-type", proof_type.as_str().as_bytes());
    transcript.append(b"request-challenge", &challenge);
    transcript.append(b"proof-nonce", &nonce);
    Ok(transcript)
}

fn decode_scalar(bytes: &[u8]) -> ProtocolResult<Scalar> {
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| ProtocolError::Malformed("expected 32-byte scalar".to_string()))?;
    Option::<Scalar>::from(Scalar::from_canonical_bytes(array))
        .ok_or(ProtocolError::Crypto(veritas_crypto::CryptoError::InvalidScalar))
}

fn decode_point(bytes: &[u8]) -> ProtocolResult<CompressedRistretto> {
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| ProtocolError::Malformed("expected 32-byte point".to_string()))?;
    Ok(CompressedRistretto(array))
}

fn decode_field(hex_str: &str, expected_len: usize, what: &str) -> ProtocolResult<Vec<u8>> {
    let bytes = decode_hex(hex_str).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    if bytes.len() != expected_len {
        return Err(ProtocolError::Malformed(format!(
            "{what}: expected {expected_len} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Serializes an opening proof into a triple.
pub(crate) fn pack_opening(proof: &OpeningProof) -> ProofTriple {
    let mut b = Vec::with_capacity(64);
    b.extend_from_slice(proof.s1.as_bytes());
    b.extend_from_slice(proof.s2.as_bytes());
    ProofTriple {
        a: encode_hex(proof.t.as_bytes()),
        b: encode_hex(&b),
        c: encode_hex(proof.c.as_bytes()),
    }
}

/// Deserializes an opening proof from a triple.
pub(crate) fn unpack_opening(triple: &ProofTriple) -> ProtocolResult<OpeningProof> {
    let a = decode_field(&triple.a, 32, "opening first message")?;
    let b = decode_field(&triple.b, 64, "opening responses")?;
    let c = decode_field(&triple.c, 32, "challenge")?;
    Ok(OpeningProof {
        t: decode_point(&a)?,
        c: decode_scalar(&c)?,
        s1: decode_scalar(&b[..32])?,
        s2: decode_scalar(&b[32..])?,
    })
}

/// Serializes a range proof into a triple plus hex bit commitments.
pub(crate) fn pack_range(proof: &RangeProof) -> (ProofTriple, Vec<String>) {
    let mut a = Vec::with_capacity(proof.bits.len() * 64);
    let mut b = Vec::with_capacity(proof.bits.len() * 96);
    for bit in &proof.bits {
        a.extend_from_slice(bit.t0.as_bytes());
        a.extend_from_slice(bit.t1.as_bytes());
        b.extend_from_slice(bit.c0.as_bytes());
        b.extend_from_slice(bit.s0.as_bytes());
        b.extend_from_slice(bit.s1.as_bytes());
    }
    let bit_commitments = proof
        .bit_commitments
        .iter()
        .map(|c| encode_hex(c.as_bytes()))
        .collect();
    let triple = ProofTriple {
        a: encode_hex(&a),
        b: encode_hex(&b),
        c: encode_hex(proof.challenge.as_bytes()),
    };
    (triple, bit_commitments)
}

fn unpack_bits(a: &[u8], b: &[u8], n_bits: usize) -> ProtocolResult<Vec<BitProof>> {
    let mut bits = Vec::with_capacity(n_bits);
    for i in 0..n_bits {
        let msg = &a[i * 64..(i + 1) * 64];
        let rsp = &b[i * 96..(i + 1) * 96];
        bits.push(BitProof {
            t0: decode_point(&msg[..32])?,
            t1: decode_point(&msg[32..])?,
            c0: decode_scalar(&rsp[..32])?,
            s0: decode_scalar(&rsp[32..64])?,
            s1: decode_scalar(&rsp[64..])?,
        });
    }
    Ok(bits)
}

fn decode_bit_commitments(hex_points: &[String]) -> ProtocolResult<Vec<CompressedRistretto>> {
    hex_points
        .iter()
        .map(|h| decode_point(&decode_field(h, 32, "bit commitment")?))
        .collect()
}

/// Deserializes a range proof from a triple and its bit commitments.
pub(crate) fn unpack_range(
    triple: &ProofTriple,
    bit_commitments_hex: &[String],
    n_bits: usize,
) -> ProtocolResult<RangeProof> {
    if bit_commitments_hex.len() != n_bits {
        return Err(ProtocolError::Malformed(format!(
            "expected {n_bits} bit commitments, got {}",
            bit_commitments_hex.len()
        )));
    }
    let a = decode_field(&triple.a, n_bits * 64, "range first messages")?;
    let b = decode_field(&triple.b, n_bits * 96, "range responses")?;
    let c = decode_field(&triple.c, 32, "challenge")?;
    Ok(RangeProof {
        bit_commitments: decode_bit_commitments(bit_commitments_hex)?,
        bits: unpack_bits(&a, &b, n_bits)?,
        challenge: decode_scalar(&c)?,
    })
}

/// Serializes an opening proof and a range proof sharing one challenge.
pub(crate) fn pack_combined(
    opening: &OpeningProof,
    range: &RangeProof,
) -> (ProofTriple, Vec<String>) {
    let mut a = Vec::with_capacity(32 + range.bits.len() * 64);
    a.extend_from_slice(opening.t.as_bytes());
    let mut b = Vec::with_capacity(64 + range.bits.len() * 96);
    b.extend_from_slice(opening.s1.as_bytes());
    b.extend_from_slice(opening.s2.as_bytes());
    for bit in &range.bits {
        a.extend_from_slice(bit.t0.as_bytes());
        a.extend_from_slice(bit.t1.as_bytes());
        b.extend_from_slice(bit.c0.as_bytes());
        b.extend_from_slice(bit.s0.as_bytes());
        b.extend_from_slice(bit.s1.as_bytes());
    }
    let bit_commitments = range
        .bit_commitments
        .iter()
        .map(|c| encode_hex(c.as_bytes()))
        .collect();
    let triple = ProofTriple {
        a: encode_hex(&a),
        b: encode_hex(&b),
        c: encode_hex(opening.c.as_bytes()),
    };
    (triple, bit_commitments)
}

/// Deserializes a combined proof. Both sub-proofs carry the same challenge
/// scalar from field `c`.
pub(crate) fn unpack_combined(
    triple: &ProofTriple,
    bit_commitments_hex: &[String],
    n_bits: usize,
) -> ProtocolResult<(OpeningProof, RangeProof)> {
    if bit_commitments_hex.len() != n_bits {
        return Err(ProtocolError::Malformed(format!(
            "expected {n_bits} bit commitments, got {}",
            bit_commitments_hex.len()
        )));
    }
    let a = decode_field(&triple.a, 32 + n_bits * 64, "combined first messages")?;
    let b = decode_field(&triple.b, 64 + n_bits * 96, "combined responses")?;
    let c = decode_scalar(&decode_field(&triple.c, 32, "challenge")?)?;

    let opening = OpeningProof {
        t: decode_point(&a[..32])?,
        c,
        s1: decode_scalar(&b[..32])?,
        s2: decode_scalar(&b[32..64])?,
    };
    let range = RangeProof {
        bit_commitments: decode_bit_commitments(bit_commitments_hex)?,
        bits: unpack_bits(&a[32..], &b[64..], n_bits)?,
        challenge: c,
    };
    Ok((opening, range))
}

/// Serializes a Merkle path as per-step hex strings: sibling (32 bytes)
/// followed by a direction byte (1 when the sibling is on the left).
pub(crate) fn pack_merkle_path(path: &[MerkleStep]) -> Vec<String> {
    path.iter()
        .map(|step| {
            let mut bytes = Vec::with_capacity(33);
            bytes.extend_from_slice(&step.sibling);
            bytes.push(u8::from(step.sibling_on_left));
            encode_hex(&bytes)
        })
        .collect()
}

/// Deserializes a Merkle path from per-step hex strings.
pub(crate) fn unpack_merkle_path(steps: &[String]) -> ProtocolResult<Vec<MerkleStep>> {
    steps
        .iter()
        .map(|hex_step| {
            let bytes = decode_field(hex_step, 33, "merkle path step")?;
            let sibling: [u8; 32] = bytes[..32]
                .try_into()
                .map_err(|_| ProtocolError::Malformed("merkle sibling".to_string()))?;
            Ok(MerkleStep {
                sibling,
                sibling_on_left: bytes[32] == 1,
            })
        })
        .collect()
}

/// Absorbs a Merkle path into the transcript so the challenge binds to
/// the exact path the prover used.
pub(crate) fn append_merkle_path(transcript: &mut Transcript, path: &[MerkleStep]) {
    for step in path {
        transcript.append(b"merkle-sibling", &step.sibling);
        transcript.append_u64(b"merkle-on-left", u64::from(step.sibling_on_left));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use veritas_crypto::{FeatureTree, PedersenGens};

    #[test]
    fn opening_pack_roundtrip() {
        let gens = PedersenGens::default();
        let mut t = Transcript::new(b"codec-test");
        let proof = OpeningProof::prove(
            &gens,
            Scalar::from(7u64),
            Scalar::random(&mut OsRng),
            &mut t,
            &mut OsRng,
        );
        let triple = pack_opening(&proof);
        assert_eq!(unpack_opening(&triple).unwrap(), proof);
    }

    #[test]
    fn range_pack_roundtrip() {
        let gens = PedersenGens::default();
        let mut t = Transcript::new(b"codec-test");
        let proof =
            RangeProof::prove(&gens, 42, Scalar::random(&mut OsRng), 8, &mut t, &mut OsRng)
                .unwrap();
        let (triple, bit_commitments) = pack_range(&proof);
        assert_eq!(unpack_range(&triple, &bit_commitments, 8).unwrap(), proof);
    }

    #[test]
    fn merkle_path_pack_roundtrip() {
        let tree = FeatureTree::build(&["a", "b", "c", "d", "e"]).unwrap();
        let proof = tree.prove("c").unwrap();
        let packed = pack_merkle_path(&proof.path);
        assert_eq!(unpack_merkle_path(&packed).unwrap(), proof.path);
    }

    #[test]
    fn truncated_fields_rejected() {
        let triple = ProofTriple {
            a: "ab".to_string(),
            b: "cd".to_string(),
            c: "ef".to_string(),
        };
        assert!(unpack_opening(&triple).is_err());
        assert!(unpack_range(&triple, &[], 8).is_err());
    }

    #[test]
    fn non_canonical_scalar_rejected() {
        // The group order minus nothing: all-0xff exceeds the order.
        let triple = ProofTriple {
            a: "00".repeat(32),
            b: "ff".repeat(64),
            c: "00".repeat(32),
        };
        assert!(unpack_opening(&triple).is_err());
    }
}
