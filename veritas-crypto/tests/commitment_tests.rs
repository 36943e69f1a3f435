use rand::rngs::OsRng;
use veritas_crypto::{Commitment, PedersenGens, Scalar};

#[test]
fn commit_is_deterministic() {
    let gens = PedersenGens::default();
    let v = Scalar::from(12u64);
    let r = Scalar::random(&mut OsRng);
    assert_eq!(gens.commit(v, r), gens.commit(v, r));
}

#[test]
fn open_accepts_correct_opening() {
    let gens = PedersenGens::default();
    let v = Scalar::from(99u64);
    let r = Scalar::random(&mut OsRng);
    let c = gens.commit(v, r);
    assert!(gens.open(&c, v, r));
}

#[test]
fn open_rejects_wrong_value_for_any_blinding() {
    // Binding: no (v', r') with v' != v opens the commitment.
    let gens = PedersenGens::default();
    let v = Scalar::from(99u64);
    let r = Scalar::random(&mut OsRng);
    let c = gens.commit(v, r);

    assert!(!gens.open(&c, Scalar::from(100u64), r));
    for _ in 0..32 {
        assert!(!gens.open(&c, Scalar::from(100u64), Scalar::random(&mut OsRng)));
    }
}

#[test]
fn open_rejects_wrong_blinding() {
    let gens = PedersenGens::default();
    let v = Scalar::from(7u64);
    let c = gens.commit(v, Scalar::random(&mut OsRng));
    assert!(!gens.open(&c, v, Scalar::random(&mut OsRng)));
}

#[test]
fn commitments_to_same_value_with_fresh_blindings_do_not_collide() {
    // Hiding: repeated commitments to one value look unrelated.
    let gens = PedersenGens::default();
    let v = Scalar::from(5u64);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..64 {
        let c = gens.commit(v, Scalar::random(&mut OsRng));
        assert!(seen.insert(*c.as_bytes()), "commitment collision");
    }
}

#[test]
fn additive_homomorphism() {
    // commit(a, r1) + commit(b, r2) == commit(a+b, r1+r2)
    let gens = PedersenGens::default();
    let (a, b) = (Scalar::from(31u64), Scalar::from(11u64));
    let r1 = Scalar::random(&mut OsRng);
    let r2 = Scalar::random(&mut OsRng);

    let sum = gens.commit(a, r1).add(&gens.commit(b, r2)).unwrap();
    assert_eq!(sum, gens.commit(a + b, r1 + r2));
}

#[test]
fn subtraction_homomorphism() {
    let gens = PedersenGens::default();
    let (a, b) = (Scalar::from(31u64), Scalar::from(11u64));
    let r1 = Scalar::random(&mut OsRng);
    let r2 = Scalar::random(&mut OsRng);

    let diff = gens.commit(a, r1).sub(&gens.commit(b, r2)).unwrap();
    assert_eq!(diff, gens.commit(a - b, r1 - r2));
}

#[test]
fn commitment_hex_is_64_chars() {
    let gens = PedersenGens::default();
    let c = gens.commit(Scalar::from(1u64), Scalar::random(&mut OsRng));
    assert_eq!(c.to_hex().len(), 64);
}

#[test]
fn serde_roundtrip() {
    let gens = PedersenGens::default();
    let c = gens.commit(Scalar::from(3u64), Scalar::random(&mut OsRng));
    let json = serde_json::to_string(&c).unwrap();
    let back: Commitment = serde_json::from_str(&json).unwrap();
    assert_eq!(c, back);
}
