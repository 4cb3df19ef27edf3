pub mod cli;
pub mod config;
pub mod dump;
pub mod error;
pub mod evaluate;
pub mod io;
pub mod logging;
pub mod vector;

pub use config::Settings;
pub use dump::{ClusterRecord, DumpParser};
pub use error::{EvalError, EvalResult};
pub use evaluate::{
    ClusterEvaluator, ClusterReport, Evaluation, EvaluationContext, Metrics, evaluate,
    evaluate_file, mean_between_against_reference, mean_within_sum_square,
};
pub use vector::{DistanceMeasure, SparseVector};
