//! Cluster quality evaluation.
//!
//! Turns parsed cluster records into the two aggregate statistics:
//!
//! - **MWSS**: mean within-cluster sum of squares, the summed point
//!   contributions recorded in the dump divided by the total point count.
//! - **MBSS**: mean between-cluster sum of squares, each centroid's distance
//!   to the grand centroid weighted by cluster size, divided by the total
//!   point count.
//!
//! The grand centroid is the point-count-weighted average of all centroids.
//! Each evaluation owns an [`EvaluationContext`]; nothing is shared between
//! calls, so independent dumps can be evaluated on separate threads.
//!
//! # Example
//!
//! ```rust
//! use clustereval::evaluate;
//!
//! let dump = r#"{"identifier":"VL-0","r":[],"c":[{"a":1.0}],"n":2}
//!   1.0: [distance=0.0]
//!   1.0: [distance=0.0]
//! {"identifier":"VL-1","r":[],"c":[{"a":3.0}],"n":2}
//!   1.0: [distance=0.0]
//!   1.0: [distance=0.0]
//! "#;
//!
//! let metrics = evaluate(dump.as_bytes(), "SquaredEuclidean").unwrap();
//! assert!((metrics.mean_between_sum_square - 1.0).abs() < 1e-12);
//! assert_eq!(metrics.mean_within_sum_square, 0.0);
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dump::parser::DISTANCE_MARKER;
use crate::dump::{ClusterRecord, DumpLines, DumpParser, parse_point_distance};
use crate::error::{EvalError, EvalResult};
use crate::vector::{DistanceMeasure, SparseVector};

/// Aggregate quality metrics of one clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(rename = "Mean Between Sum Square (MBSS)")]
    pub mean_between_sum_square: f64,

    #[serde(rename = "Mean Within Sum Square (MWSS)")]
    pub mean_within_sum_square: f64,
}

/// Per-cluster figures of a finished evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterReport {
    pub label: String,
    pub npoints: u64,
    pub observed_points: u64,
    pub sse: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub bss: f64,
}

/// Full result of [`ClusterEvaluator::evaluate_detailed`].
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub measure: DistanceMeasure,
    pub metrics: Metrics,
    pub total_points: u64,
    pub grand_centroid: SparseVector,
    /// Reports in dump order.
    pub clusters: Vec<ClusterReport>,
}

/// Sum of the declared point counts.
///
/// Fails with [`EvalError::EmptyDump`] when there are no clusters or no points,
/// and with [`EvalError::NonFinite`] when the sum does not fit in a `u64`.
pub fn total_points(clusters: &[ClusterRecord]) -> EvalResult<u64> {
    let total = clusters
        .iter()
        .try_fold(0u64, |acc, c| acc.checked_add(c.npoints))
        .ok_or_else(|| EvalError::NonFinite {
            context: "total point count".to_string(),
        })?;
    if clusters.is_empty() || total == 0 {
        return Err(EvalError::EmptyDump {
            clusters: clusters.len(),
            points: total,
        });
    }
    Ok(total)
}

/// Point-count-weighted average of all centroids, and the total point count.
///
/// Fails with [`EvalError::EmptyDump`] when there are no clusters or no points.
pub fn grand_centroid(clusters: &[ClusterRecord]) -> EvalResult<(SparseVector, u64)> {
    let total = total_points(clusters)?;

    let mut centre = SparseVector::new();
    for rec in clusters {
        centre.add_scaled(&rec.centroid, rec.npoints as f64 / total as f64);
    }
    Ok((centre, total))
}

/// Running state of one evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    measure: DistanceMeasure,
    grand_centroid: SparseVector,
    total_points: u64,
    bss_total: f64,
    wss_total: f64,
}

impl EvaluationContext {
    /// Compute the grand centroid of `clusters` and start with empty sums.
    pub fn new(measure: DistanceMeasure, clusters: &[ClusterRecord]) -> EvalResult<Self> {
        let (grand_centroid, total_points) = grand_centroid(clusters)?;
        Ok(Self::with_centre(measure, grand_centroid, total_points))
    }

    /// Start from an externally supplied centre of mass.
    pub fn with_centre(measure: DistanceMeasure, centre: SparseVector, total_points: u64) -> Self {
        Self {
            measure,
            grand_centroid: centre,
            total_points,
            bss_total: 0.0,
            wss_total: 0.0,
        }
    }

    /// Between-cluster contribution of `rec`, added to the running total.
    pub fn add_between(&mut self, rec: &ClusterRecord) -> EvalResult<f64> {
        let raw = self
            .measure
            .distance(&self.grand_centroid, &rec.centroid)
            .map_err(|e| match e {
                EvalError::DegenerateVector { .. } => EvalError::DegenerateVector {
                    context: format!("vector comparing grand centroid with cluster {}", rec.label),
                },
                EvalError::NonFinite { context } => EvalError::NonFinite {
                    context: format!("{context} from grand centroid to cluster {}", rec.label),
                },
                other => other,
            })?;
        let bss = rec.npoints as f64 * self.measure.squared_contribution(raw);
        if !bss.is_finite() {
            return Err(EvalError::NonFinite {
                context: format!("between-cluster sum of squares of cluster {}", rec.label),
            });
        }
        self.bss_total += bss;
        Ok(bss)
    }

    pub fn add_within(&mut self, rec: &ClusterRecord) {
        self.wss_total += rec.sse;
    }

    pub fn grand_centroid(&self) -> &SparseVector {
        &self.grand_centroid
    }

    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    /// Mean sums of squares so far; an overflowed sum is an error, never Inf.
    pub fn metrics(&self) -> EvalResult<Metrics> {
        let n = self.total_points as f64;
        let metrics = Metrics {
            mean_between_sum_square: self.bss_total / n,
            mean_within_sum_square: self.wss_total / n,
        };
        if !metrics.mean_between_sum_square.is_finite() {
            return Err(EvalError::NonFinite {
                context: "mean between-cluster sum of squares".to_string(),
            });
        }
        if !metrics.mean_within_sum_square.is_finite() {
            return Err(EvalError::NonFinite {
                context: "mean within-cluster sum of squares".to_string(),
            });
        }
        Ok(metrics)
    }

    fn into_centre(self) -> SparseVector {
        self.grand_centroid
    }
}

/// Evaluates cluster dumps under one distance measure.
#[derive(Debug, Clone, Copy)]
pub struct ClusterEvaluator {
    measure: DistanceMeasure,
}

impl ClusterEvaluator {
    pub fn new(measure: DistanceMeasure) -> Self {
        Self { measure }
    }

    /// Resolve a measure by name.
    pub fn from_name(name: &str) -> EvalResult<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn measure(&self) -> DistanceMeasure {
        self.measure
    }

    pub fn evaluate<R: BufRead>(&self, reader: R) -> EvalResult<Metrics> {
        Ok(self.evaluate_detailed(reader)?.metrics)
    }

    pub fn evaluate_detailed<R: BufRead>(&self, reader: R) -> EvalResult<Evaluation> {
        let clusters = DumpParser::parse(reader, self.measure)?;
        self.evaluate_clusters(&clusters)
    }

    /// Evaluate records that were already parsed with this evaluator's measure.
    pub fn evaluate_clusters(&self, clusters: &[ClusterRecord]) -> EvalResult<Evaluation> {
        let mut ctx = EvaluationContext::new(self.measure, clusters)?;
        debug!(
            "[evaluate] grand centroid over {} points has {} terms",
            ctx.total_points(),
            ctx.grand_centroid().len()
        );

        let mut reports = Vec::with_capacity(clusters.len());
        for rec in clusters {
            let bss = ctx.add_between(rec)?;
            ctx.add_within(rec);
            reports.push(ClusterReport {
                label: rec.label.clone(),
                npoints: rec.npoints,
                observed_points: rec.observed_points,
                sse: rec.sse,
                min: rec.min_distance(),
                max: rec.max_distance(),
                bss,
            });
        }

        let metrics = ctx.metrics()?;
        info!(
            "[evaluate] {} clusters, {} points, measure {}: MBSS={} MWSS={}",
            clusters.len(),
            ctx.total_points(),
            self.measure,
            metrics.mean_between_sum_square,
            metrics.mean_within_sum_square
        );

        Ok(Evaluation {
            measure: self.measure,
            metrics,
            total_points: ctx.total_points(),
            grand_centroid: ctx.into_centre(),
            clusters: reports,
        })
    }
}

/// Evaluate a dump stream under the measure called `measure_name`.
///
/// The name is resolved before the stream is touched.
pub fn evaluate<R: BufRead>(reader: R, measure_name: &str) -> EvalResult<Metrics> {
    ClusterEvaluator::from_name(measure_name)?.evaluate(reader)
}

/// Evaluate the dump file at `path`.
///
/// An unknown measure name fails before the file is opened.
pub fn evaluate_file(path: impl AsRef<Path>, measure_name: &str) -> EvalResult<Metrics> {
    let evaluator = ClusterEvaluator::from_name(measure_name)?;
    let file = File::open(path.as_ref())?;
    evaluator.evaluate(BufReader::new(file))
}

/// Mean per-point contribution over every point line in the stream.
///
/// Only point lines are read, so headers are not required here.
pub fn mean_within_sum_square<R: BufRead>(
    reader: R,
    measure: DistanceMeasure,
) -> EvalResult<f64> {
    let mut sse = 0.0;
    let mut points: u64 = 0;

    for line in DumpLines::new(reader) {
        let (line_number, line) = line?;
        if !line.contains(DISTANCE_MARKER) {
            continue;
        }
        let raw = parse_point_distance(&line)
            .map_err(|reason| EvalError::malformed(line_number, &line, reason))?;
        sse += measure.squared_contribution(raw);
        points += 1;
    }

    if points == 0 {
        return Err(EvalError::EmptyDump {
            clusters: 0,
            points: 0,
        });
    }
    let mean = sse / points as f64;
    if !mean.is_finite() {
        return Err(EvalError::NonFinite {
            context: "mean within-cluster sum of squares".to_string(),
        });
    }
    Ok(mean)
}

/// Mean between-cluster sum of squares against an external centre of mass.
///
/// The centre is the centroid of the first cluster in `reference`, typically
/// a dump produced with a single cluster over the same data.
pub fn mean_between_against_reference<R: BufRead, S: BufRead>(
    reader: R,
    reference: S,
    measure: DistanceMeasure,
) -> EvalResult<f64> {
    let centre = DumpParser::parse(reference, measure)?
        .into_iter()
        .next()
        .map(|rec| rec.centroid)
        .ok_or(EvalError::EmptyDump {
            clusters: 0,
            points: 0,
        })?;

    let clusters = DumpParser::parse(reader, measure)?;
    let total = total_points(&clusters)?;

    let mut ctx = EvaluationContext::with_centre(measure, centre, total);
    for rec in &clusters {
        ctx.add_between(rec)?;
    }
    Ok(ctx.metrics()?.mean_between_sum_square)
}
