//! Two-sample Kolmogorov-Smirnov comparison of numeric columns.

use std::f64::consts::PI;

use serde::Serialize;

use crate::error::{Result, ScanError};

/// Outcome of comparing one column of a sample against its reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub column: String,
    /// Max absolute distance between the two empirical CDFs, in [0, 1].
    pub statistic: f64,
    pub p_value: f64,
    /// `1 - p_value`; larger means more evidence of divergence.
    pub significance: f64,
}

/// Compare `sample` against `reference` for the column named `column`.
///
/// Both the statistic and the significance are independent of argument order.
pub fn compare(column: &str, reference: &[f64], sample: &[f64]) -> Result<ComparisonResult> {
    if reference.is_empty() || sample.is_empty() {
        return Err(ScanError::comparison(
            column,
            format!(
                "both samples must contain data (got {} and {} values)",
                reference.len(),
                sample.len()
            ),
        ));
    }
    if reference.iter().chain(sample).any(|v| v.is_nan()) {
        return Err(ScanError::comparison(column, "samples contain NaN"));
    }

    let mut a = reference.to_vec();
    let mut b = sample.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let statistic = ks_statistic(&a, &b);
    let p_value = asymptotic_p_value(statistic, a.len(), b.len());

    Ok(ComparisonResult {
        column: column.to_string(),
        statistic,
        p_value,
        significance: 1.0 - p_value,
    })
}

/// Max |F_a(x) - F_b(x)| over all x, for two sorted samples.
///
/// Ties are handled by stepping past every copy of the current value in
/// both samples before measuring the distance.
fn ks_statistic(a: &[f64], b: &[f64]) -> f64 {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut d: f64 = 0.0;

    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n1 - j as f64 / n2).abs());
    }
    d
}

/// Asymptotic two-sided p-value, `P(K > sqrt(n1*n2/(n1+n2)) * D)`.
fn asymptotic_p_value(d: f64, n1: usize, n2: usize) -> f64 {
    let en = (n1 as f64 * n2 as f64 / (n1 + n2) as f64).sqrt();
    kolmogorov_sf(en * d)
}

/// Survival function of the Kolmogorov distribution, `P(K > lambda)`.
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let sf = if lambda < 1.18 {
        // Small lambda: the alternating series converges slowly, use the
        // theta-function form of the CDF instead.
        let y = (-PI * PI / (8.0 * lambda * lambda)).exp();
        let cdf = (2.0 * PI).sqrt() / lambda * (y + y.powi(9) + y.powi(25) + y.powi(49));
        1.0 - cdf
    } else {
        let x = (-2.0 * lambda * lambda).exp();
        2.0 * (x - x.powi(4) + x.powi(9) - x.powi(16))
    };
    sf.clamp(0.0, 1.0)
}
