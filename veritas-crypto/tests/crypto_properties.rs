//! Property-based tests for the crypto primitives.
//!
//! These verify the contracts the protocol depends on:
//! - Commitments are binding and additively homomorphic
//! - Schnorr opening proofs are complete and reject wrong statements
//! - Range proofs accept exactly the in-range witnesses
//! - Merkle proofs verify for members and fail for non-members

use proptest::prelude::*;
use rand::rngs::OsRng;
use veritas_crypto::{
    FeatureTree, OpeningProof, PedersenGens, RangeProof, Scalar, Transcript,
};

fn feature_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{1,12}", 1..16)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Binding: a commitment never opens to a different value.
    #[test]
    fn commitment_binding(v in any::<u64>(), v2 in any::<u64>()) {
        prop_assume!(v != v2);
        let gens = PedersenGens::default();
        let r = Scalar::random(&mut OsRng);
        let c = gens.commit(Scalar::from(v), r);

        prop_assert!(gens.open(&c, Scalar::from(v), r));
        prop_assert!(!gens.open(&c, Scalar::from(v2), r));
        prop_assert!(!gens.open(&c, Scalar::from(v2), Scalar::random(&mut OsRng)));
    }

    /// Hiding: fresh blindings give distinct commitments to the same value.
    #[test]
    fn commitment_hiding(v in any::<u64>()) {
        let gens = PedersenGens::default();
        let c1 = gens.commit(Scalar::from(v), Scalar::random(&mut OsRng));
        let c2 = gens.commit(Scalar::from(v), Scalar::random(&mut OsRng));
        prop_assert_ne!(c1.as_bytes(), c2.as_bytes());
    }

    /// Homomorphism over arbitrary value pairs.
    #[test]
    fn commitment_homomorphism(a in any::<u32>(), b in any::<u32>()) {
        let gens = PedersenGens::default();
        let r1 = Scalar::random(&mut OsRng);
        let r2 = Scalar::random(&mut OsRng);
        let sum = gens
            .commit(Scalar::from(a as u64), r1)
            .add(&gens.commit(Scalar::from(b as u64), r2))
            .unwrap();
        prop_assert_eq!(sum, gens.commit(Scalar::from(a as u64 + b as u64), r1 + r2));
    }

    /// Completeness of the Schnorr opening proof for arbitrary values.
    #[test]
    fn schnorr_completeness(v in any::<u64>()) {
        let gens = PedersenGens::default();
        let r = Scalar::random(&mut OsRng);
        let c = gens.commit(Scalar::from(v), r);

        let mut pt = Transcript::new(b"prop");
        let proof = OpeningProof::prove(&gens, Scalar::from(v), r, &mut pt, &mut OsRng);

        let mut vt = Transcript::new(b"prop");
        prop_assert!(proof.verify(&gens, &c, &mut vt));
    }

    /// Range proofs verify for every value that fits the width.
    #[test]
    fn range_completeness(v in 0u64..(1 << 16)) {
        let gens = PedersenGens::default();
        let r = Scalar::random(&mut OsRng);
        let c = gens.commit(Scalar::from(v), r);

        let mut pt = Transcript::new(b"prop");
        let proof = RangeProof::prove(&gens, v, r, 16, &mut pt, &mut OsRng).unwrap();

        let mut vt = Transcript::new(b"prop");
        prop_assert!(proof.verify(&gens, &c, 16, &mut vt));
    }

    /// Values that overflow the width are rejected at proving time.
    #[test]
    fn range_width_guard(v in (1u64 << 16)..(1 << 32)) {
        let gens = PedersenGens::default();
        let mut t = Transcript::new(b"prop");
        prop_assert!(
            RangeProof::prove(&gens, v, Scalar::random(&mut OsRng), 16, &mut t, &mut OsRng)
                .is_err()
        );
    }

    /// Every member of an arbitrary feature set proves inclusion; a
    /// non-member never does.
    #[test]
    fn merkle_membership(features in feature_strategy()) {
        let tree = FeatureTree::build(&features).unwrap();
        for feature in &features {
            let proof = tree.prove(feature).unwrap();
            prop_assert!(proof.verify(&tree.root()));
        }
        prop_assert!(tree.prove("not-a-feature-0").is_err());
    }
}
