use log::{debug, info, warn};
use serde::Serialize;

use super::sampler::FractionSampler;
use crate::config::{ProbeConfig, SaturationPolicy};
use crate::data::model::Dataset;
use crate::error::{Result, ScanError};
use crate::stats::ks;
use crate::stats::threshold::StatThreshold;

/// One resampling trial: means over the columns the policy kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialSample {
    pub statistic: f64,
    pub significance: f64,
    pub columns_used: usize,
    pub columns_excluded: usize,
}

/// Location and spread of one trial quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Spread {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Spread {
    /// All-zero for an empty input.
    fn of(values: impl Iterator<Item = f64> + Clone) -> Self {
        let n = values.clone().count() as f64;
        if n == 0.0 {
            return Spread::default();
        }
        let mean = values.clone().sum::<f64>() / n;
        let var = values.clone().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Spread {
            mean,
            std_dev: var.sqrt(),
            min: values.clone().fold(f64::INFINITY, f64::min),
            max: values.fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Numeric stand-in for the trial distributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialSummary {
    pub statistic: Spread,
    pub significance: Spread,
    /// Share of trials whose mean statistic is above the threshold.
    pub exceed_rate: f64,
}

/// Everything one pair scan produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairScanReport {
    pub small_rows: usize,
    pub big_rows: usize,
    pub shared_columns: Vec<String>,
    /// Critical value for two samples of the small size.
    pub threshold: f64,
    pub saturation: SaturationPolicy,
    pub trials: Vec<TrialSample>,
}

impl PairScanReport {
    /// Spread of the trial means. A report with no trials summarizes to
    /// zeros.
    pub fn summary(&self) -> TrialSummary {
        let exceeded = self
            .trials
            .iter()
            .filter(|t| t.statistic > self.threshold)
            .count();
        TrialSummary {
            statistic: Spread::of(self.trials.iter().map(|t| t.statistic)),
            significance: Spread::of(self.trials.iter().map(|t| t.significance)),
            exceed_rate: if self.trials.is_empty() {
                0.0
            } else {
                exceeded as f64 / self.trials.len() as f64
            },
        }
    }
}

/// Repeatedly resamples the larger dataset to the smaller one's size and
/// compares the shared columns.
#[derive(Debug, Clone)]
pub struct PairDatasetScanner {
    threshold: StatThreshold,
    saturation: SaturationPolicy,
    seed: Option<u64>,
}

impl Default for PairDatasetScanner {
    fn default() -> Self {
        PairDatasetScanner::from_config(&ProbeConfig::default())
    }
}

impl PairDatasetScanner {
    pub fn from_config(config: &ProbeConfig) -> Self {
        PairDatasetScanner {
            threshold: StatThreshold::from_config(config),
            saturation: config.saturation,
            seed: config.seed,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_saturation(mut self, policy: SaturationPolicy) -> Self {
        self.saturation = policy;
        self
    }

    /// Run `trials` resampling trials of `dataset_a` against `dataset_b`.
    pub fn scan_pair(
        &self,
        dataset_a: &Dataset,
        dataset_b: &Dataset,
        trials: usize,
    ) -> Result<PairScanReport> {
        if trials == 0 {
            return Err(ScanError::InvalidInput(
                "pair scan needs at least one trial".to_string(),
            ));
        }
        let (small, big) = if dataset_a.row_count() < dataset_b.row_count() {
            (dataset_a, dataset_b)
        } else {
            (dataset_b, dataset_a)
        };

        let shared_columns: Vec<String> = small
            .column_names()
            .filter(|name| big.column(name).is_some())
            .map(str::to_string)
            .collect();
        if shared_columns.is_empty() {
            return Err(ScanError::EmptyInput(
                "datasets have no numeric columns in common".to_string(),
            ));
        }
        if small.row_count() == 0 {
            return Err(ScanError::InvalidInput(
                "smaller dataset has no rows".to_string(),
            ));
        }

        let n = small.row_count();
        let threshold = self.threshold.critical_value(n, n)?;
        info!(
            "pair scan: {n} vs {} rows, {} shared columns, threshold {threshold:.5}",
            big.row_count(),
            shared_columns.len()
        );

        let mut sampler = FractionSampler::new(self.seed);
        let mut samples = Vec::with_capacity(trials);
        for trial in 0..trials {
            let resample = sampler.sample_rows(big, n)?;
            samples.push(self.run_trial(trial, small, &resample, &shared_columns)?);
        }

        let excluded: usize = samples.iter().map(|s| s.columns_excluded).sum();
        if excluded > 0 {
            warn!(
                "{excluded} column comparisons excluded across {trials} trials by the {:?} policy",
                self.saturation
            );
        }

        Ok(PairScanReport {
            small_rows: n,
            big_rows: big.row_count(),
            shared_columns,
            threshold,
            saturation: self.saturation,
            trials: samples,
        })
    }

    fn run_trial(
        &self,
        trial: usize,
        small: &Dataset,
        resample: &Dataset,
        columns: &[String],
    ) -> Result<TrialSample> {
        let mut statistic = 0.0;
        let mut significance = 0.0;
        let mut used = 0usize;

        for name in columns {
            let (Some(reference), Some(sample)) = (small.column(name), resample.column(name))
            else {
                return Err(ScanError::comparison(name, "column missing from resample"));
            };
            let result = ks::compare(name, reference, sample)?;
            if self.saturation.excludes(&result) {
                debug!(
                    "trial {trial}: column '{name}' excluded (p = {})",
                    result.p_value
                );
                continue;
            }
            statistic += result.statistic;
            significance += result.significance;
            used += 1;
        }

        if used == 0 {
            return Err(ScanError::ComparisonError {
                column: columns.join(","),
                reason: format!(
                    "trial {trial}: every column was excluded by the {:?} policy",
                    self.saturation
                ),
            });
        }

        let sample = TrialSample {
            statistic: statistic / used as f64,
            significance: significance / used as f64,
            columns_used: used,
            columns_excluded: columns.len() - used,
        };
        debug!(
            "trial {trial}: D={:.5} sig={:.5}",
            sample.statistic, sample.significance
        );
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_shared_columns() {
        let a = Dataset::from_pairs([("x", vec![1.0, 2.0])]).unwrap();
        let b = Dataset::from_pairs([("y", vec![1.0, 2.0, 3.0])]).unwrap();
        let err = PairDatasetScanner::default().scan_pair(&a, &b, 5).unwrap_err();
        assert_eq!(err.kind(), "EmptyInput");
    }

    #[test]
    fn test_zero_trials_rejected() {
        let a = Dataset::from_pairs([("x", vec![1.0, 2.0])]).unwrap();
        let err = PairDatasetScanner::default().scan_pair(&a, &a, 0).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[test]
    fn test_orders_by_size_and_counts_trials() {
        let big = Dataset::from_pairs([("x", (0..90).map(f64::from).collect())]).unwrap();
        let small = Dataset::from_pairs([("x", (0..30).map(|i| f64::from(i) * 3.0).collect())])
            .unwrap();
        let report = PairDatasetScanner::default()
            .with_seed(9)
            .with_saturation(SaturationPolicy::Include)
            .scan_pair(&big, &small, 12)
            .unwrap();
        assert_eq!(report.small_rows, 30);
        assert_eq!(report.big_rows, 90);
        assert_eq!(report.trials.len(), 12);
        // 30 < 5000: threshold = 0.05 / sqrt(2/30) * sqrt(2/30) = 0.05
        assert!((report.threshold - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_summary_spread() {
        let report = PairScanReport {
            small_rows: 1,
            big_rows: 1,
            shared_columns: vec!["x".into()],
            threshold: 0.25,
            saturation: SaturationPolicy::Include,
            trials: [0.1, 0.3]
                .iter()
                .map(|&s| TrialSample {
                    statistic: s,
                    significance: s,
                    columns_used: 1,
                    columns_excluded: 0,
                })
                .collect(),
        };
        let summary = report.summary();
        assert!((summary.statistic.mean - 0.2).abs() < 1e-12);
        assert!((summary.statistic.std_dev - 0.1).abs() < 1e-12);
        assert_eq!(summary.statistic.min, 0.1);
        assert_eq!(summary.statistic.max, 0.3);
        assert_eq!(summary.exceed_rate, 0.5);
    }

    #[test]
    fn test_summary_of_no_trials_is_zero() {
        let report = PairScanReport {
            small_rows: 0,
            big_rows: 0,
            shared_columns: Vec::new(),
            threshold: 0.25,
            saturation: SaturationPolicy::default(),
            trials: Vec::new(),
        };
        let summary = report.summary();
        assert_eq!(summary.statistic, Spread::default());
        assert_eq!(summary.significance, Spread::default());
        assert_eq!(summary.exceed_rate, 0.0);
    }
}
