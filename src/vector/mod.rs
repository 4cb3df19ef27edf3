//! Sparse vector arithmetic and the distance measures defined over it.

pub mod distance;
pub mod sparse;

pub use distance::{DistanceMeasure, cosine_distance, squared_euclidean_distance};
pub use sparse::SparseVector;
