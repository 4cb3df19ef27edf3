//! Centroid literal parsing.
//!
//! Header lines embed the centroid as a JSON array of single-entry objects:
//!
//! ```text
//! [{"court":0.41},{"judge":0.22},{"appeal":0.07}]
//! ```
//!
//! The literal is read with `serde_json`'s streaming deserializer so that the
//! parse stops at the closing `]` and reports how many bytes it consumed. The
//! text that follows (the `"n"` field) is left to the caller.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::vector::SparseVector;

#[derive(Error, Debug, PartialEq)]
pub enum CentroidError {
    #[error("centroid literal is not a JSON array of objects: {0}")]
    Syntax(String),

    #[error("centroid entry {index} has {entries} keys, expected exactly one")]
    NotSingleEntry { index: usize, entries: usize },

    #[error("centroid weight for '{term}' is not a finite number")]
    InvalidWeight { term: String },

    #[error("centroid term '{term}' appears more than once")]
    DuplicateTerm { term: String },
}

/// Parse a centroid literal at the start of `input`.
///
/// Returns the vector and the byte length of the literal within `input`.
pub fn parse_centroid(input: &str) -> Result<(SparseVector, usize), CentroidError> {
    let mut stream =
        serde_json::Deserializer::from_str(input).into_iter::<Vec<Map<String, Value>>>();

    let entries = match stream.next() {
        Some(Ok(entries)) => entries,
        Some(Err(e)) => return Err(CentroidError::Syntax(e.to_string())),
        None => return Err(CentroidError::Syntax("no literal found".to_string())),
    };
    let consumed = stream.byte_offset();

    let mut centroid = SparseVector::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        if entry.len() != 1 {
            return Err(CentroidError::NotSingleEntry {
                index,
                entries: entry.len(),
            });
        }
        for (term, value) in entry {
            let weight = value
                .as_f64()
                .filter(|w| w.is_finite())
                .ok_or_else(|| CentroidError::InvalidWeight { term: term.clone() })?;
            if centroid.contains(&term) {
                return Err(CentroidError::DuplicateTerm { term });
            }
            centroid.insert(term, weight);
        }
    }

    Ok((centroid, consumed))
}
