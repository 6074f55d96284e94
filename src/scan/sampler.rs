use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::data::model::Dataset;
use crate::error::{Result, ScanError};

/// Draws row subsets without replacement from one seeded generator.
///
/// Successive draws continue the same random stream, so a scan that creates
/// one sampler per call is reproducible for a fixed seed.
#[derive(Debug, Clone)]
pub struct FractionSampler {
    rng: StdRng,
}

impl FractionSampler {
    /// Seeded sampler, or an entropy-seeded one for `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        FractionSampler { rng }
    }

    /// `round(fraction * row_count)` rows in random order, halves rounded to
    /// even (50.5 -> 50, 51.5 -> 52).
    ///
    /// `fraction == 1.0` gives a full random permutation of the rows.
    pub fn sample(&mut self, dataset: &Dataset, fraction: f64) -> Result<Dataset> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ScanError::InvalidInput(format!(
                "fraction must lie in (0, 1], got {fraction}"
            )));
        }
        let n = dataset.row_count();
        if n == 0 {
            return Err(ScanError::InvalidInput(
                "cannot sample a dataset with no rows".to_string(),
            ));
        }
        let count = (fraction * n as f64).round_ties_even() as usize;
        if count == 0 {
            return Err(ScanError::InvalidInput(format!(
                "fraction {fraction} of {n} rows rounds to an empty sample"
            )));
        }
        self.sample_rows(dataset, count)
    }

    /// Exactly `count` rows in random order.
    pub fn sample_rows(&mut self, dataset: &Dataset, count: usize) -> Result<Dataset> {
        let n = dataset.row_count();
        if count == 0 || count > n {
            return Err(ScanError::InvalidInput(format!(
                "cannot draw {count} rows without replacement from {n}"
            )));
        }
        let rows = index::sample(&mut self.rng, n, count).into_vec();
        Ok(dataset.take_rows(&rows))
    }
}
