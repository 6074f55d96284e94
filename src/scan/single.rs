use log::{debug, info};
use serde::Serialize;

use super::sampler::FractionSampler;
use crate::config::ProbeConfig;
use crate::data::model::Dataset;
use crate::error::{Result, ScanError};
use crate::stats::knee::{CurveSpec, KneeFinder, KneePoint};
use crate::stats::ks::{self, ComparisonResult};
use crate::stats::threshold::StatThreshold;

// ---------------------------------------------------------------------------
// FractionSeries
// ---------------------------------------------------------------------------

/// Strictly descending sampling fractions in (0, 1], starting at 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FractionSeries(Vec<f64>);

impl FractionSeries {
    pub fn new(fractions: Vec<f64>) -> Result<Self> {
        match fractions.first() {
            None => {
                return Err(ScanError::InvalidInput(
                    "fraction series is empty".to_string(),
                ))
            }
            Some(&first) if first != 1.0 => {
                return Err(ScanError::InvalidInput(format!(
                    "fraction series must start at 1.0, got {first}"
                )))
            }
            _ => {}
        }
        if let Some(&f) = fractions.iter().find(|f| !(**f > 0.0 && **f <= 1.0)) {
            return Err(ScanError::InvalidInput(format!(
                "fraction {f} is outside (0, 1]"
            )));
        }
        if fractions.windows(2).any(|w| w[1] >= w[0]) {
            return Err(ScanError::InvalidInput(
                "fraction series must be strictly descending".to_string(),
            ));
        }
        Ok(FractionSeries(fractions))
    }

    /// `num` evenly spaced fractions from 1.0 down to `min_fraction`, both
    /// ends included.
    pub fn linspace(num: usize, min_fraction: f64) -> Result<Self> {
        if num == 0 {
            return Err(ScanError::InvalidInput(
                "fraction series needs at least one step".to_string(),
            ));
        }
        if num == 1 {
            return FractionSeries::new(vec![1.0]);
        }
        let step = (1.0 - min_fraction) / (num - 1) as f64;
        let mut fractions: Vec<f64> = (0..num).map(|i| 1.0 - step * i as f64).collect();
        // Pin the last value so rounding does not move the floor.
        fractions[num - 1] = min_fraction;
        FractionSeries::new(fractions)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Per-fraction summary across all columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub fraction: f64,
    pub sample_rows: usize,
    /// Mean KS statistic.
    pub statistic: f64,
    /// Mean significance (`1 - p`).
    pub significance: f64,
    /// Critical value for this subset size.
    pub threshold: f64,
    /// Base alpha rescaled to this subset size.
    pub adjusted_alpha: f64,
    pub columns: Vec<ComparisonResult>,
}

/// Everything one single-dataset scan produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleScanReport {
    pub label: String,
    pub row_count: usize,
    pub fractions: FractionSeries,
    pub rows: Vec<AggregateRow>,
    pub statistic_knee: Option<KneePoint>,
    pub significance_knee: Option<KneePoint>,
}

impl SingleScanReport {
    /// Fraction at the statistic knee: the smallest sample that still tracks
    /// the full dataset. `None` when the curve has no clear knee.
    pub fn representative_fraction(&self) -> Option<f64> {
        self.statistic_knee
            .map(|k| self.fractions.as_slice()[k.index])
    }

    pub fn thresholds(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.threshold).collect()
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Compares shrinking random subsets of one dataset against the whole.
#[derive(Debug, Clone)]
pub struct SingleDatasetScanner {
    threshold: StatThreshold,
    knee: KneeFinder,
    num_fractions: usize,
    min_fraction: f64,
    statistic_curve: CurveSpec,
    significance_curve: CurveSpec,
    seed: Option<u64>,
}

impl Default for SingleDatasetScanner {
    fn default() -> Self {
        SingleDatasetScanner::from_config(&ProbeConfig::default())
    }
}

impl SingleDatasetScanner {
    pub fn from_config(config: &ProbeConfig) -> Self {
        SingleDatasetScanner {
            threshold: StatThreshold::from_config(config),
            knee: KneeFinder::new(config.knee_sensitivity),
            num_fractions: config.num_fractions,
            min_fraction: config.min_fraction,
            statistic_curve: config.statistic_curve,
            significance_curve: config.significance_curve,
            seed: config.seed,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// One [`AggregateRow`] per fraction, in series order.
    ///
    /// Any column failure aborts the scan.
    pub fn scan(&self, dataset: &Dataset, fractions: &FractionSeries) -> Result<Vec<AggregateRow>> {
        if dataset.column_count() == 0 {
            return Err(ScanError::EmptyInput(
                "dataset has no numeric columns".to_string(),
            ));
        }
        let n = dataset.row_count();
        let mut sampler = FractionSampler::new(self.seed);
        let mut rows = Vec::with_capacity(fractions.len());

        for &fraction in fractions.as_slice() {
            let subset = sampler.sample(dataset, fraction)?;
            let sample_rows = subset.row_count();

            let columns = dataset
                .columns()
                .iter()
                .zip(subset.columns())
                .map(|(full, sub)| ks::compare(&full.name, &full.values, &sub.values))
                .collect::<Result<Vec<_>>>()?;

            let k = columns.len() as f64;
            let row = AggregateRow {
                fraction,
                sample_rows,
                statistic: columns.iter().map(|c| c.statistic).sum::<f64>() / k,
                significance: columns.iter().map(|c| c.significance).sum::<f64>() / k,
                threshold: self.threshold.critical_value(n, sample_rows)?,
                adjusted_alpha: self.threshold.adjusted_alpha(n, sample_rows)?,
                columns,
            };
            debug!(
                "fraction {fraction:.3} ({sample_rows} rows): D={:.5} sig={:.5} threshold={:.5}",
                row.statistic, row.significance, row.threshold
            );
            rows.push(row);
        }

        Ok(rows)
    }

    /// Scan with the configured fraction series and locate the knees of the
    /// statistic and significance curves.
    pub fn report(&self, label: &str, dataset: &Dataset) -> Result<SingleScanReport> {
        let fractions = FractionSeries::linspace(self.num_fractions, self.min_fraction)?;
        let rows = self.scan(dataset, &fractions)?;

        let positions: Vec<f64> = (0..rows.len()).map(|i| i as f64).collect();
        let statistics: Vec<f64> = rows.iter().map(|r| r.statistic).collect();
        let significances: Vec<f64> = rows.iter().map(|r| r.significance).collect();

        let statistic_knee = self.knee.find_knee(
            &statistics,
            &positions,
            self.statistic_curve.shape,
            self.statistic_curve.direction,
        )?;
        let significance_knee = self.knee.find_knee(
            &significances,
            &positions,
            self.significance_curve.shape,
            self.significance_curve.direction,
        )?;

        let report = SingleScanReport {
            label: label.to_string(),
            row_count: dataset.row_count(),
            fractions,
            rows,
            statistic_knee,
            significance_knee,
        };
        match report.representative_fraction() {
            Some(f) => info!("{label}: representative fraction {f:.3}"),
            None => info!("{label}: no clear minimum representative fraction"),
        }
        Ok(report)
    }
}
