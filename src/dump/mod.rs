//! Cluster-dump reading: header/point line parsing and per-cluster records.

pub mod centroid;
pub mod parser;
pub mod record;

pub use centroid::{CentroidError, parse_centroid};
pub use parser::{
    ClusterHeader, DumpLines, DumpParser, parse_header, parse_point_distance,
};
pub use record::ClusterRecord;
