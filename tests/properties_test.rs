//! Property-based tests for the threshold, the KS comparison and the sampler.

use proptest::prelude::*;

use repsample::{compare, threshold, Dataset, FractionSampler, ScanError};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_threshold_is_symmetric(a in 1usize..1_000_000, b in 1usize..1_000_000, level in 0.001f64..5.0) {
        // Property: swapping the two sizes never changes the critical value
        let ab = threshold(a, b, level).unwrap();
        let ba = threshold(b, a, level).unwrap();
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn prop_threshold_non_increasing(a in 1usize..100_000, b in 1usize..100_000, step in 1usize..10_000) {
        // Property: growing either sample never raises the critical value
        let base = threshold(a, b, 1.037).unwrap();
        prop_assert!(threshold(a + step, b, 1.037).unwrap() <= base);
        prop_assert!(threshold(a, b + step, 1.037).unwrap() <= base);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_identical_columns_match(values in prop::collection::vec(-1e6f64..1e6, 1..300)) {
        let r = compare("c", &values, &values).unwrap();
        prop_assert_eq!(r.statistic, 0.0);
        prop_assert_eq!(r.significance, 0.0);
    }

    #[test]
    fn prop_compare_order_independent(
        a in prop::collection::vec(-100f64..100.0, 1..200),
        b in prop::collection::vec(-100f64..100.0, 1..200),
    ) {
        let ab = compare("c", &a, &b).unwrap();
        let ba = compare("c", &b, &a).unwrap();
        prop_assert_eq!(ab.statistic, ba.statistic);
        prop_assert_eq!(ab.significance, ba.significance);
        prop_assert!((0.0..=1.0).contains(&ab.statistic));
        prop_assert!((0.0..=1.0).contains(&ab.significance));
    }

    #[test]
    fn prop_sampler_row_counts(n in 1usize..2_000, seed in any::<u64>()) {
        let ds = Dataset::from_pairs([("v", (0..n).map(|i| i as f64).collect())]).unwrap();
        let mut sampler = FractionSampler::new(Some(seed));

        prop_assert_eq!(sampler.sample(&ds, 1.0).unwrap().row_count(), n);

        // Halves go to the even neighbour: 1 -> 0, 3 -> 2, 5 -> 2, 7 -> 4.
        let half = match n % 4 {
            1 => n / 2,
            3 => n / 2 + 1,
            _ => n / 2,
        };
        let result = sampler.sample(&ds, 0.5);
        if half == 0 {
            prop_assert!(matches!(result, Err(ScanError::InvalidInput(_))));
        } else {
            prop_assert_eq!(result.unwrap().row_count(), half);
        }
    }

    #[test]
    fn prop_sampler_rejects_out_of_range(fraction in prop_oneof![-10.0f64..=0.0, 1.0001f64..10.0]) {
        let ds = Dataset::from_pairs([("v", vec![1.0, 2.0, 3.0])]).unwrap();
        let result = FractionSampler::new(Some(0)).sample(&ds, fraction);
        prop_assert!(matches!(result, Err(ScanError::InvalidInput(_))));
    }
}
