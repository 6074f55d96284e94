//! Knee (elbow) detection with the Kneedle algorithm.
//!
//! Both axes are normalized to [0, 1] and the curve is reoriented so that its
//! knee becomes the maximum of the difference curve `y - x`, i.e. the point
//! furthest from the chord joining the endpoints. A maximum is accepted as the
//! knee once the difference curve drops below
//! `max - S * mean(|dx|)` before reaching the next local minimum.
//!
//! Satopaa, V., Albrecht, J., Irwin, D., & Raghavan, B. (2011). Finding a
//! "Kneedle" in a Haystack: Detecting Knee Points in System Behavior.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Differences closer to zero than this are treated as zero.
const FLAT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveShape {
    Convex,
    Concave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveDirection {
    Increasing,
    Decreasing,
}

/// Shape and direction declared for one curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveSpec {
    pub shape: CurveShape,
    pub direction: CurveDirection,
}

impl Default for CurveSpec {
    fn default() -> Self {
        CurveSpec {
            shape: CurveShape::Convex,
            direction: CurveDirection::Increasing,
        }
    }
}

/// The detected knee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KneePoint {
    /// Position in the input slices.
    pub index: usize,
    /// Input x value at the knee.
    pub x: f64,
    /// Curve value at the knee.
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KneeFinder {
    /// `S`: how many average x-steps of decline confirm a knee.
    pub sensitivity: f64,
}

impl Default for KneeFinder {
    fn default() -> Self {
        KneeFinder { sensitivity: 1.0 }
    }
}

impl KneeFinder {
    pub fn new(sensitivity: f64) -> Self {
        KneeFinder { sensitivity }
    }

    /// Locate the knee of `values` plotted against `indices`.
    ///
    /// `Ok(None)` means the curve has no clear knee (flat, straight, or too
    /// short); it is not an error.
    pub fn find_knee(
        &self,
        values: &[f64],
        indices: &[f64],
        shape: CurveShape,
        direction: CurveDirection,
    ) -> Result<Option<KneePoint>> {
        if values.len() != indices.len() {
            return Err(ScanError::InvalidInput(format!(
                "knee search needs one index per value (got {} values, {} indices)",
                values.len(),
                indices.len()
            )));
        }
        if values.iter().chain(indices).any(|v| !v.is_finite()) {
            return Err(ScanError::InvalidInput(
                "knee search input contains non-finite numbers".to_string(),
            ));
        }
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(ScanError::InvalidInput(format!(
                "knee sensitivity must be a non-negative number (got {})",
                self.sensitivity
            )));
        }

        let n = values.len();
        if n < 3 {
            return Ok(None);
        }
        let (Some(x_norm), Some(y_norm)) = (normalize(indices), normalize(values)) else {
            return Ok(None);
        };

        let flipped = matches!(
            (shape, direction),
            (CurveShape::Convex, CurveDirection::Increasing)
                | (CurveShape::Concave, CurveDirection::Decreasing)
        );
        let y_t = reorient(&y_norm, shape, direction);

        let diff: Vec<f64> = y_t
            .iter()
            .zip(&x_norm)
            .map(|(y, x)| {
                let d = y - x;
                if d.abs() < FLAT_EPSILON {
                    0.0
                } else {
                    d
                }
            })
            .collect();

        let is_max = local_extrema(&diff, |a, b| a >= b);
        let is_min = local_extrema(&diff, |a, b| a <= b);
        let Some(first_max) = is_max.iter().position(|&m| m) else {
            return Ok(None);
        };

        let mean_step =
            x_norm.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>() / (n - 1) as f64;

        let mut threshold = 0.0;
        let mut threshold_index = first_max;
        for i in first_max..n - 1 {
            if is_max[i] {
                threshold = diff[i] - self.sensitivity * mean_step;
                threshold_index = i;
            }
            if is_min[i] {
                threshold = 0.0;
            }
            if diff[i + 1] < threshold {
                let index = if flipped {
                    n - 1 - threshold_index
                } else {
                    threshold_index
                };
                return Ok(Some(KneePoint {
                    index,
                    x: indices[index],
                    value: values[index],
                }));
            }
        }

        Ok(None)
    }
}

/// Min-max scale to [0, 1]; `None` for a constant input.
fn normalize(v: &[f64]) -> Option<Vec<f64>> {
    let min = v.iter().copied().fold(f64::INFINITY, f64::min);
    let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= 0.0 {
        return None;
    }
    Some(v.iter().map(|x| (x - min) / range).collect())
}

/// Turn every curve kind into a concave increasing one, whose knee is a maximum.
fn reorient(y: &[f64], shape: CurveShape, direction: CurveDirection) -> Vec<f64> {
    let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    match (shape, direction) {
        (CurveShape::Concave, CurveDirection::Increasing) => y.to_vec(),
        (CurveShape::Concave, CurveDirection::Decreasing) => y.iter().rev().copied().collect(),
        (CurveShape::Convex, CurveDirection::Decreasing) => y.iter().map(|v| max - v).collect(),
        (CurveShape::Convex, CurveDirection::Increasing) => {
            y.iter().rev().map(|v| max - v).collect()
        }
    }
}

/// Mark points that satisfy `cmp` against both neighbours; edges compare
/// against themselves.
fn local_extrema(v: &[f64], cmp: impl Fn(f64, f64) -> bool) -> Vec<bool> {
    let last = v.len() - 1;
    (0..v.len())
        .map(|i| {
            let left = v[i.saturating_sub(1)];
            let right = v[(i + 1).min(last)];
            cmp(v[i], left) && cmp(v[i], right)
        })
        .collect()
}
