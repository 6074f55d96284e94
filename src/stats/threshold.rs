use crate::config::ProbeConfig;
use crate::error::{Result, ScanError};

/// `sqrt((a + b) / (a * b))`, the two-sample KS scaling factor.
fn scale(a: usize, b: usize) -> f64 {
    let (a, b) = (a as f64, b as f64);
    ((a + b) / (a * b)).sqrt()
}

/// Size-adjusted critical value: `base_level * sqrt((n_ref + n_sample) / (n_ref * n_sample))`.
///
/// Symmetric in the two sizes and non-increasing in each of them.
pub fn threshold(n_reference: usize, n_sample: usize, base_level: f64) -> Result<f64> {
    if n_reference == 0 || n_sample == 0 {
        return Err(ScanError::InvalidInput(format!(
            "sample sizes must be positive (got {n_reference} and {n_sample})"
        )));
    }
    Ok(base_level * scale(n_reference, n_sample))
}

/// Chooses the base level from the reference size and applies [`threshold`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatThreshold {
    pub size_cutoff: usize,
    pub base_alpha: f64,
    pub asymptotic_alpha: f64,
}

impl Default for StatThreshold {
    fn default() -> Self {
        StatThreshold::from_config(&ProbeConfig::default())
    }
}

impl StatThreshold {
    pub fn from_config(config: &ProbeConfig) -> Self {
        StatThreshold {
            size_cutoff: config.size_cutoff,
            base_alpha: config.base_alpha,
            asymptotic_alpha: config.asymptotic_alpha,
        }
    }

    /// Base level for a reference of `n_reference` rows.
    ///
    /// Below the cutoff: `base_alpha` divided by the self-comparison factor.
    /// At or above it: the asymptotic constant.
    pub fn base_level(&self, n_reference: usize) -> Result<f64> {
        if n_reference == 0 {
            return Err(ScanError::InvalidInput(
                "reference dataset has no rows".to_string(),
            ));
        }
        if n_reference < self.size_cutoff {
            Ok(self.base_alpha / scale(n_reference, n_reference))
        } else {
            Ok(self.asymptotic_alpha)
        }
    }

    /// Critical value for comparing `n_sample` rows against `n_reference` rows.
    pub fn critical_value(&self, n_reference: usize, n_sample: usize) -> Result<f64> {
        threshold(n_reference, n_sample, self.base_level(n_reference)?)
    }

    /// `base_alpha` rescaled from the self-comparison size to `n_sample`.
    pub fn adjusted_alpha(&self, n_reference: usize, n_sample: usize) -> Result<f64> {
        let self_scale = threshold(n_reference, n_reference, 1.0)?;
        Ok(threshold(n_reference, n_sample, self.base_alpha)? / self_scale)
    }
}
