//! Property-based invariants of the index: containment, monotonic bucket
//! assignment, clamp closure, idempotent builds, and size accounting.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use rmi_core::search::{BinarySearch, Search};
use rmi_core::{
    BoundPolicy, CubicSpline, GlobalAbsolute, GlobalIndividual, LinearRegression, LinearSpline,
    LocalAbsolute, LocalIndividual, Model, NoBounds, Radix, Rmi, RmiGAbs, RmiGInd, RmiLAbs,
    RmiLInd, RmiNoBounds,
};

fn sorted_keys() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(any::<u64>(), 1..300).prop_map(|mut v| {
        v.sort_unstable();
        v
    })
}

fn check_containment<L1, L2, B>(keys: &[u64], layer2_size: usize) -> Result<(), TestCaseError>
where
    L1: Model<u64>,
    L2: Model<u64>,
    B: BoundPolicy,
{
    let rmi = Rmi::<u64, L1, L2, B>::new(keys, layer2_size).unwrap();
    for (i, &key) in keys.iter().enumerate() {
        let a = rmi.search(key);
        prop_assert!(
            a.lo <= i && i < a.hi,
            "key {} at {} outside [{}, {}), layer2_size {}",
            key,
            i,
            a.lo,
            a.hi,
            layer2_size
        );
    }
    Ok(())
}

proptest! {
    #[test]
    fn containment_holds_for_every_bound_mode(
        keys in sorted_keys(),
        layer2_size in 1usize..128,
    ) {
        check_containment::<LinearSpline, LinearRegression, LocalIndividual>(&keys, layer2_size)?;
        check_containment::<LinearSpline, LinearRegression, LocalAbsolute>(&keys, layer2_size)?;
        check_containment::<LinearSpline, LinearRegression, GlobalIndividual>(&keys, layer2_size)?;
        check_containment::<LinearSpline, LinearRegression, GlobalAbsolute>(&keys, layer2_size)?;
        check_containment::<LinearSpline, LinearRegression, NoBounds>(&keys, layer2_size)?;
    }

    #[test]
    fn containment_holds_for_every_model_kind(
        keys in sorted_keys(),
        layer2_size in 1usize..64,
    ) {
        check_containment::<CubicSpline, LinearSpline, LocalAbsolute>(&keys, layer2_size)?;
        check_containment::<Radix, LinearRegression, GlobalIndividual>(&keys, layer2_size)?;
        check_containment::<LinearRegression, CubicSpline, LocalIndividual>(&keys, layer2_size)?;
        check_containment::<LinearSpline, Radix, GlobalAbsolute>(&keys, layer2_size)?;
    }

    #[test]
    fn bucket_assignment_is_monotone(
        keys in sorted_keys(),
        layer2_size in 1usize..128,
    ) {
        let rmi = RmiLAbs::<u64, LinearSpline, LinearSpline>::new(&keys, layer2_size).unwrap();
        let mut prev = 0;
        for &key in &keys {
            let bucket = rmi.get_bucket(key);
            prop_assert!(bucket >= prev);
            prop_assert!(bucket < layer2_size);
            prev = bucket;
        }

        let rmi = RmiLAbs::<u64, Radix, LinearSpline>::new(&keys, layer2_size).unwrap();
        let mut prev = 0;
        for &key in &keys {
            let bucket = rmi.get_bucket(key);
            prop_assert!(bucket >= prev);
            prop_assert!(bucket < layer2_size);
            prev = bucket;
        }
    }

    #[test]
    fn queries_stay_clamped_for_arbitrary_probes(
        keys in sorted_keys(),
        probes in prop::collection::vec(any::<u64>(), 1..100),
        layer2_size in 1usize..128,
    ) {
        let rmi = RmiGInd::<u64, LinearRegression, LinearSpline>::new(&keys, layer2_size).unwrap();
        for probe in probes {
            let a = rmi.search(probe);
            prop_assert!(a.pos < keys.len());
            prop_assert!(a.lo <= a.hi);
            prop_assert!(a.hi <= keys.len());
        }
    }

    #[test]
    fn builds_are_idempotent(
        keys in sorted_keys(),
        layer2_size in 1usize..128,
    ) {
        let a = RmiLInd::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();
        let b = RmiLInd::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();
        for &key in &keys {
            prop_assert_eq!(a.search(key), b.search(key));
        }
    }

    #[test]
    fn lookup_resolves_to_first_occurrence(
        keys in sorted_keys(),
        layer2_size in 1usize..64,
    ) {
        let rmi = RmiLAbs::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();
        for &key in &keys {
            let expected = keys.partition_point(|&k| k < key);
            let found = BinarySearch::lookup(&keys, rmi.search(key), key);
            prop_assert_eq!(found, Some(expected));
        }
    }

    #[test]
    fn bound_mode_sizes_are_ordered(
        keys in sorted_keys(),
        layer2_size in 1usize..128,
    ) {
        let nb = RmiNoBounds::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();
        let gabs = RmiGAbs::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();
        let gind = RmiGInd::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();
        let labs = RmiLAbs::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();
        let lind = RmiLInd::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();

        prop_assert!(nb.size_in_bytes() <= gabs.size_in_bytes());
        prop_assert!(gabs.size_in_bytes() <= gind.size_in_bytes());
        prop_assert!(gind.size_in_bytes() <= labs.size_in_bytes());
        prop_assert!(labs.size_in_bytes() <= lind.size_in_bytes());
    }

    #[test]
    fn global_absolute_bound_is_tight(
        keys in sorted_keys(),
        layer2_size in 1usize..64,
    ) {
        let rmi = RmiGAbs::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();
        let err = rmi.bounds().error();

        let mut worst = 0;
        for (i, &key) in keys.iter().enumerate() {
            worst = worst.max(rmi.search(key).pos.abs_diff(i));
        }
        prop_assert_eq!(worst, err);
    }

    #[test]
    fn local_absolute_bounds_are_tight(
        keys in sorted_keys(),
        layer2_size in 1usize..64,
    ) {
        let rmi = RmiLAbs::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();

        let mut worst = vec![0usize; layer2_size];
        for (i, &key) in keys.iter().enumerate() {
            let bucket = rmi.get_bucket(key);
            worst[bucket] = worst[bucket].max(rmi.search(key).pos.abs_diff(i));
        }
        prop_assert_eq!(&worst[..], rmi.bounds().errors());
    }

    #[test]
    fn local_individual_bounds_track_each_side(
        keys in sorted_keys(),
        layer2_size in 1usize..64,
    ) {
        let rmi = RmiLInd::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();

        let mut worst = vec![(0usize, 0usize); layer2_size];
        for (i, &key) in keys.iter().enumerate() {
            let bucket = rmi.get_bucket(key);
            let pos = rmi.search(key).pos;
            if pos > i {
                worst[bucket].0 = worst[bucket].0.max(pos - i);
            } else {
                worst[bucket].1 = worst[bucket].1.max(i - pos);
            }
        }
        for (bucket, residuals) in rmi.bounds().errors().iter().enumerate() {
            prop_assert_eq!((residuals.lo, residuals.hi), worst[bucket]);
        }
    }

    #[test]
    fn global_individual_bounds_track_each_side(
        keys in sorted_keys(),
        layer2_size in 1usize..64,
    ) {
        let rmi = RmiGInd::<u64, LinearSpline, LinearRegression>::new(&keys, layer2_size).unwrap();

        let (mut lo, mut hi) = (0usize, 0usize);
        for (i, &key) in keys.iter().enumerate() {
            let pos = rmi.search(key).pos;
            if pos > i {
                lo = lo.max(pos - i);
            } else {
                hi = hi.max(i - pos);
            }
        }
        prop_assert_eq!((lo, hi), (rmi.bounds().error_lo(), rmi.bounds().error_hi()));
    }
}
