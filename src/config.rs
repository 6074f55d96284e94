use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::stats::knee::CurveSpec;
use crate::stats::ks::ComparisonResult;

/// Which columns a pair-test trial leaves out of its mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SaturationPolicy {
    /// Keep every column.
    Include,
    /// Drop columns whose significance is exactly 1 (p-value 0, or too small
    /// to register against 1 in an f64).
    #[default]
    ExcludeSaturated,
    /// Drop columns whose p-value is exactly 1.
    ExcludePerfectMatch,
}

impl SaturationPolicy {
    /// Whether this column comparison is left out.
    pub fn excludes(self, result: &ComparisonResult) -> bool {
        match self {
            SaturationPolicy::Include => false,
            SaturationPolicy::ExcludeSaturated => result.significance >= 1.0,
            SaturationPolicy::ExcludePerfectMatch => result.p_value >= 1.0,
        }
    }
}

/// Options consumed by the scanners. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Number of steps in the fraction series.
    pub num_fractions: usize,
    /// Smallest fraction of the series.
    pub min_fraction: f64,
    /// Row count at which the threshold switches to the asymptotic constant.
    pub size_cutoff: usize,
    /// Critical-value coefficient at or above the cutoff.
    pub asymptotic_alpha: f64,
    /// Nominal alpha below the cutoff.
    pub base_alpha: f64,
    /// Pair-test repetitions.
    pub trials: usize,
    /// Kneedle `S`.
    pub knee_sensitivity: f64,
    /// Sampling seed; `None` draws a fresh one per scan.
    pub seed: Option<u64>,
    pub saturation: SaturationPolicy,
    /// Curve declaration for the mean KS statistic.
    pub statistic_curve: CurveSpec,
    /// Curve declaration for the mean significance.
    pub significance_curve: CurveSpec,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            num_fractions: 10,
            min_fraction: 0.1,
            size_cutoff: 5000,
            asymptotic_alpha: 1.037,
            base_alpha: 0.05,
            trials: 50,
            knee_sensitivity: 1.0,
            seed: None,
            saturation: SaturationPolicy::default(),
            statistic_curve: CurveSpec::default(),
            significance_curve: CurveSpec::default(),
        }
    }
}

impl ProbeConfig {
    /// Read a JSON config file and validate it.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: ProbeConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validating config file {}", path.display()))?;
        Ok(config)
    }

    /// Reject values no scan can run with.
    pub fn validate(&self) -> Result<()> {
        if self.num_fractions == 0 {
            return invalid("num_fractions must be at least 1");
        }
        if !(self.min_fraction > 0.0 && self.min_fraction <= 1.0) {
            return invalid(format!(
                "min_fraction must lie in (0, 1], got {}",
                self.min_fraction
            ));
        }
        if self.num_fractions > 1 && self.min_fraction == 1.0 {
            return invalid("min_fraction must be below 1 when num_fractions > 1");
        }
        for (name, v) in [
            ("asymptotic_alpha", self.asymptotic_alpha),
            ("base_alpha", self.base_alpha),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return invalid(format!("{name} must be a positive number, got {v}"));
            }
        }
        if self.trials == 0 {
            return invalid("trials must be at least 1");
        }
        if !(self.knee_sensitivity.is_finite() && self.knee_sensitivity >= 0.0) {
            return invalid(format!(
                "knee_sensitivity must be a non-negative number, got {}",
                self.knee_sensitivity
            ));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> Result<()> {
    Err(ScanError::InvalidInput(msg.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::knee::{CurveDirection, CurveShape};

    #[test]
    fn test_defaults() {
        let c = ProbeConfig::default();
        assert_eq!(c.num_fractions, 10);
        assert_eq!(c.min_fraction, 0.1);
        assert_eq!(c.size_cutoff, 5000);
        assert_eq!(c.asymptotic_alpha, 1.037);
        assert_eq!(c.base_alpha, 0.05);
        assert_eq!(c.trials, 50);
        assert_eq!(c.knee_sensitivity, 1.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let c: ProbeConfig = serde_json::from_str(
            r#"{"trials": 7, "saturation": "include",
                "significance_curve": {"shape": "concave", "direction": "decreasing"}}"#,
        )
        .unwrap();
        assert_eq!(c.trials, 7);
        assert_eq!(c.saturation, SaturationPolicy::Include);
        assert_eq!(c.significance_curve.shape, CurveShape::Concave);
        assert_eq!(c.significance_curve.direction, CurveDirection::Decreasing);
        assert_eq!(c.num_fractions, 10);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(serde_json::from_str::<ProbeConfig>(r#"{"trails": 7}"#).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            ProbeConfig { min_fraction: 0.0, ..Default::default() },
            ProbeConfig { min_fraction: 1.5, ..Default::default() },
            ProbeConfig { num_fractions: 0, ..Default::default() },
            ProbeConfig { trials: 0, ..Default::default() },
            ProbeConfig { base_alpha: -0.05, ..Default::default() },
            ProbeConfig { knee_sensitivity: f64::NAN, ..Default::default() },
        ];
        for c in bad {
            assert!(matches!(c.validate(), Err(ScanError::InvalidInput(_))), "{c:?}");
        }
    }

    fn result(p_value: f64) -> ComparisonResult {
        ComparisonResult {
            column: "c".into(),
            statistic: 0.5,
            p_value,
            significance: 1.0 - p_value,
        }
    }

    #[test]
    fn test_saturation_policy() {
        assert!(SaturationPolicy::ExcludeSaturated.excludes(&result(0.0)));
        assert!(SaturationPolicy::ExcludeSaturated.excludes(&result(1e-40)));
        assert!(!SaturationPolicy::ExcludeSaturated.excludes(&result(0.01)));
        assert!(SaturationPolicy::ExcludePerfectMatch.excludes(&result(1.0)));
        assert!(!SaturationPolicy::ExcludePerfectMatch.excludes(&result(0.0)));
        assert!(!SaturationPolicy::Include.excludes(&result(0.0)));
    }
}
