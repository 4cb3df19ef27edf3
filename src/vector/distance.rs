//! Distance measures between sparse vectors.
//!
//! The set of measures is closed: each variant carries its own implementation,
//! so a name can never resolve to a missing function.
//!
//! | Measure | Range | Degenerate input |
//! |---------|-------|------------------|
//! | Cosine | [0, 2] | zero-norm vector → [`EvalError::DegenerateVector`] |
//! | SquaredEuclidean | [0, ∞) | none |
//!
//! # Aggregation exponent
//!
//! Sum-of-squares statistics square raw distances before summing, except for
//! `SquaredEuclidean`, whose output is already squared. See
//! [`DistanceMeasure::squared_contribution`].

use std::fmt;
use std::str::FromStr;

use super::SparseVector;
use crate::error::{EvalError, EvalResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceMeasure {
    /// `1 - (x·y) / (|x||y|)`.
    Cosine,
    /// `Σ(x_k - y_k)²` over the union of keys.
    SquaredEuclidean,
}

impl DistanceMeasure {
    pub const ALL: [DistanceMeasure; 2] =
        [DistanceMeasure::Cosine, DistanceMeasure::SquaredEuclidean];

    pub fn name(&self) -> &'static str {
        match self {
            DistanceMeasure::Cosine => "Cosine",
            DistanceMeasure::SquaredEuclidean => "SquaredEuclidean",
        }
    }

    /// Distance between `x` and `y` under this measure.
    ///
    /// A result that overflows `f64` is reported as [`EvalError::NonFinite`].
    pub fn distance(&self, x: &SparseVector, y: &SparseVector) -> EvalResult<f64> {
        let d = match self {
            DistanceMeasure::Cosine => cosine_distance(x, y)?,
            DistanceMeasure::SquaredEuclidean => squared_euclidean_distance(x, y),
        };
        if !d.is_finite() {
            return Err(EvalError::NonFinite {
                context: format!("{self} distance"),
            });
        }
        Ok(d)
    }

    /// Whether raw distances must be squared before they enter a sum of squares.
    pub fn squares_raw_distance(&self) -> bool {
        !matches!(self, DistanceMeasure::SquaredEuclidean)
    }

    /// Contribution of one raw distance to a sum-of-squares statistic.
    pub fn squared_contribution(&self, raw: f64) -> f64 {
        if self.squares_raw_distance() {
            raw * raw
        } else {
            raw
        }
    }
}

impl fmt::Display for DistanceMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMeasure {
    type Err = EvalError;

    /// Case-insensitive match on the canonical names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EvalError::UnknownDistanceMeasure(s.to_string()))
    }
}

/// Cosine distance: `1 - (x·y)/(|x||y|)`.
///
/// Keys present on only one side contribute nothing to the dot product.
/// A zero-norm operand makes the quotient undefined and is reported instead
/// of producing NaN.
///
/// Both operands are divided by their largest absolute weight first. The
/// quotient is scale-invariant, and scaled weights lie in `[-1, 1]` with at
/// least one of magnitude 1, so neither norm can overflow or underflow to 0.
pub fn cosine_distance(x: &SparseVector, y: &SparseVector) -> EvalResult<f64> {
    let x_scale = x.max_abs_weight();
    if x_scale == 0.0 {
        return Err(EvalError::DegenerateVector {
            context: "left operand".to_string(),
        });
    }
    let y_scale = y.max_abs_weight();
    if y_scale == 0.0 {
        return Err(EvalError::DegenerateVector {
            context: "right operand".to_string(),
        });
    }

    let x_norm = scaled_norm(x, x_scale);
    let y_norm = scaled_norm(y, y_scale);
    let dot: f64 = x
        .iter()
        .map(|(term, xv)| (xv / x_scale) * (y.get(term) / y_scale))
        .sum();

    Ok(1.0 - dot / (x_norm * y_norm))
}

fn scaled_norm(v: &SparseVector, scale: f64) -> f64 {
    v.iter()
        .map(|(_, w)| {
            let w = w / scale;
            w * w
        })
        .sum::<f64>()
        .sqrt()
}

/// Squared Euclidean distance over the union of keys; a missing key counts as 0.
pub fn squared_euclidean_distance(x: &SparseVector, y: &SparseVector) -> f64 {
    let shared_and_left: f64 = x
        .iter()
        .map(|(term, xv)| {
            let diff = xv - y.get(term);
            diff * diff
        })
        .sum();

    let right_only: f64 = y
        .iter()
        .filter(|(term, _)| !x.contains(term))
        .map(|(_, yv)| yv * yv)
        .sum();

    shared_and_left + right_only
}
