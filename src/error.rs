//! Error types for cluster-dump evaluation.
//!
//! Every failure is surfaced to the caller of the evaluation entry points.
//! Nothing here is recovered internally: a guessed value would silently skew
//! the aggregate statistics.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    /// A line carried a header or point marker but its fields could not be read.
    #[error("Malformed dump at line {line}: {reason}\n  {content}")]
    MalformedDump {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("Point distance at line {line} appears before any cluster header\n  {content}")]
    NoActiveCluster { line: usize, content: String },

    /// Cosine distance against a zero-norm vector.
    #[error("Degenerate vector: cosine distance is undefined for a zero-norm {context}")]
    DegenerateVector { context: String },

    /// A distance, count or sum that cannot be represented as a finite number.
    #[error("Numeric overflow: {context} is not representable as a finite value")]
    NonFinite { context: String },

    #[error("Unknown distance measure '{0}'. Expected one of: Cosine, SquaredEuclidean")]
    UnknownDistanceMeasure(String),

    #[error("Empty dump: {clusters} clusters with {points} total points")]
    EmptyDump { clusters: usize, points: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EvalError {
    pub(crate) fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Self {
        EvalError::MalformedDump {
            line,
            content: content.trim_end().to_string(),
            reason: reason.into(),
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
