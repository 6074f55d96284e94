//! End-to-end tests of the single-dataset and pair scanners on seeded
//! synthetic data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use repsample::{
    Dataset, FractionSampler, FractionSeries, PairDatasetScanner, ProbeConfig, SaturationPolicy,
    ScanError, SingleDatasetScanner,
};

fn gauss(rng: &mut StdRng, mean: f64, sd: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    mean + sd * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Three numeric columns: normal, exponential, integer-valued.
fn synthetic(rows: usize, seed: u64, shift: f64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = (0..rows).map(|_| gauss(&mut rng, shift, 1.0)).collect();
    let expo = (0..rows)
        .map(|_| -(1.0 - rng.gen::<f64>()).ln() + shift)
        .collect();
    let counts = (0..rows)
        .map(|_| (rng.gen_range(0..20) as f64) + (shift * 10.0).round())
        .collect();
    Dataset::from_pairs([("normal", normal), ("expo", expo), ("counts", counts)]).unwrap()
}

#[test]
fn test_single_scan_three_fractions() {
    let ds = synthetic(10_000, 1, 0.0);
    let series = FractionSeries::new(vec![1.0, 0.5, 0.1]).unwrap();
    let rows = SingleDatasetScanner::default()
        .with_seed(7)
        .scan(&ds, &series)
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows.iter().map(|r| r.sample_rows).collect::<Vec<_>>(),
        vec![10_000, 5_000, 1_000]
    );
    for row in &rows {
        assert!(row.statistic >= 0.0);
        assert!((0.0..=1.0).contains(&row.significance));
        assert_eq!(row.columns.len(), 3);
    }

    // A full-size sample is a permutation of the same rows.
    assert_eq!(rows[0].statistic, 0.0);
    assert_eq!(rows[0].significance, 0.0);

    // 10_000 rows is above the cutoff: threshold = 1.037 * sqrt(1/N + 1/n).
    let expected = [0.014_665_395, 0.017_961_367, 0.034_393_399];
    for (row, want) in rows.iter().zip(expected) {
        assert!((row.threshold - want).abs() < 1e-8, "{} vs {want}", row.threshold);
    }

    // Smaller subsets get a larger critical value.
    assert!(rows.windows(2).all(|w| w[1].threshold >= w[0].threshold));
}

#[test]
fn test_single_scan_below_cutoff_threshold() {
    let ds = synthetic(400, 2, 0.0);
    let series = FractionSeries::new(vec![1.0, 0.25]).unwrap();
    let rows = SingleDatasetScanner::default()
        .with_seed(3)
        .scan(&ds, &series)
        .unwrap();
    // base = 0.05 / sqrt(2/400), then scaled by sqrt(1/400 + 1/n).
    assert!((rows[0].threshold - 0.05).abs() < 1e-12);
    let want = 0.05 / (2.0f64 / 400.0).sqrt() * (1.0f64 / 400.0 + 1.0 / 100.0).sqrt();
    assert!((rows[1].threshold - want).abs() < 1e-12);
    assert!((rows[0].adjusted_alpha - 0.05).abs() < 1e-12);
}

#[test]
fn test_scan_is_idempotent_for_fixed_seed() {
    let ds = synthetic(3_000, 4, 0.0);
    let series = FractionSeries::linspace(10, 0.1).unwrap();
    let scanner = SingleDatasetScanner::default().with_seed(99);
    let a = scanner.scan(&ds, &series).unwrap();
    let b = scanner.scan(&ds, &series).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_report_knee_points_into_series() {
    let ds = synthetic(5_000, 5, 0.0);
    let config = ProbeConfig {
        seed: Some(11),
        ..Default::default()
    };
    let report = SingleDatasetScanner::from_config(&config)
        .report("synthetic", &ds)
        .unwrap();
    assert_eq!(report.rows.len(), 10);
    assert_eq!(report.fractions.len(), 10);
    assert_eq!(report.thresholds().len(), 10);
    match report.statistic_knee {
        Some(knee) => assert_eq!(
            report.representative_fraction(),
            Some(report.fractions.as_slice()[knee.index])
        ),
        None => assert_eq!(report.representative_fraction(), None),
    }
}

#[test]
fn test_scan_fails_when_fraction_rounds_to_nothing() {
    let ds = synthetic(4, 6, 0.0);
    let series = FractionSeries::new(vec![1.0, 0.1]).unwrap();
    let err = SingleDatasetScanner::default()
        .with_seed(1)
        .scan(&ds, &series)
        .unwrap_err();
    assert!(matches!(err, ScanError::InvalidInput(_)));
}

#[test]
fn test_pair_scan_same_distribution_passes() {
    let big = synthetic(4_000, 8, 0.0);
    let small = FractionSampler::new(Some(2)).sample_rows(&big, 1_000).unwrap();

    let report = PairDatasetScanner::default()
        .with_seed(21)
        .scan_pair(&small, &big, 50)
        .unwrap();
    assert_eq!(report.trials.len(), 50);
    assert_eq!(report.small_rows, 1_000);
    assert_eq!(report.big_rows, 4_000);
    assert_eq!(report.shared_columns, vec!["normal", "expo", "counts"]);

    let summary = report.summary();
    assert!(summary.significance.mean < 0.95, "{summary:?}");
    assert!(summary.statistic.mean < report.threshold, "{summary:?}");
}

#[test]
fn test_pair_scan_shifted_distribution_saturates() {
    let base = synthetic(2_000, 12, 0.0);
    let shifted = synthetic(1_000, 13, 3.0);

    // Every column is saturated, so the default policy has nothing left.
    let err = PairDatasetScanner::default()
        .with_seed(5)
        .scan_pair(&base, &shifted, 5)
        .unwrap_err();
    assert_eq!(err.kind(), "ComparisonError");

    let report = PairDatasetScanner::default()
        .with_seed(5)
        .with_saturation(SaturationPolicy::Include)
        .scan_pair(&base, &shifted, 5)
        .unwrap();
    for trial in &report.trials {
        assert_eq!(trial.significance, 1.0);
        assert_eq!(trial.columns_used, 3);
        assert!(trial.statistic > report.threshold);
    }
    assert_eq!(report.summary().exceed_rate, 1.0);
}

#[test]
fn test_pair_scan_perfect_match_policy() {
    let ds = synthetic(500, 14, 0.0);

    // Equal sizes: the resample is a permutation, so every p-value is 1.
    let report = PairDatasetScanner::default()
        .with_seed(2)
        .with_saturation(SaturationPolicy::Include)
        .scan_pair(&ds, &ds, 3)
        .unwrap();
    assert!(report.trials.iter().all(|t| t.significance == 0.0));

    let err = PairDatasetScanner::default()
        .with_seed(2)
        .with_saturation(SaturationPolicy::ExcludePerfectMatch)
        .scan_pair(&ds, &ds, 3)
        .unwrap_err();
    assert_eq!(err.kind(), "ComparisonError");

    // The default policy keeps perfect matches.
    let report = PairDatasetScanner::default()
        .with_seed(2)
        .scan_pair(&ds, &ds, 3)
        .unwrap();
    assert!(report.trials.iter().all(|t| t.columns_excluded == 0));
}

#[test]
fn test_pair_scan_uses_shared_columns_only() {
    let a = Dataset::from_pairs([
        ("x", (0..300).map(|i| (i % 17) as f64).collect()),
        ("only_a", vec![1.0; 300]),
    ])
    .unwrap();
    let b = Dataset::from_pairs([
        ("only_b", vec![2.0; 900]),
        ("x", (0..900).map(|i| (i % 17) as f64).collect()),
    ])
    .unwrap();
    let report = PairDatasetScanner::default()
        .with_seed(3)
        .scan_pair(&a, &b, 4)
        .unwrap();
    assert_eq!(report.shared_columns, vec!["x"]);
}
