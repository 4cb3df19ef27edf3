//! Sparse term-weight vectors.
//!
//! A centroid in a cluster dump is a bag-of-words or TF-IDF vector: an
//! unbounded vocabulary where each vector only touches a handful of terms.
//! Vectors are therefore keyed by term, and every operation works on the
//! union or intersection of key sets. A missing key is an implicit zero.
//!
//! # Example
//!
//! ```rust
//! use clustereval::SparseVector;
//!
//! let a: SparseVector = [("apple", 1.0), ("pear", 2.0)].into_iter().collect();
//! let b: SparseVector = [("pear", 1.0), ("plum", 4.0)].into_iter().collect();
//!
//! let sum = a.add(&b);
//! assert_eq!(sum.get("pear"), 3.0);
//! assert_eq!(sum.get("plum"), 4.0);
//! assert_eq!(a.dot(&b), 2.0);
//! ```

use std::collections::HashMap;

/// Mapping from term to weight.
///
/// Zero entries may be stored or omitted; arithmetic treats both the same.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    weights: HashMap<String, f64>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            weights: HashMap::with_capacity(capacity),
        }
    }

    /// Set the weight for `term`, returning the previous weight if one was stored.
    pub fn insert(&mut self, term: impl Into<String>, weight: f64) -> Option<f64> {
        self.weights.insert(term.into(), weight)
    }

    /// Weight for a term (0.0 if not present).
    pub fn get(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.weights.contains_key(term)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, w)| (k.as_str(), *w))
    }

    /// Every entry multiplied by `factor`.
    pub fn scale(&self, factor: f64) -> SparseVector {
        self.weights
            .iter()
            .map(|(term, w)| (term.clone(), w * factor))
            .collect()
    }

    /// Entry-wise sum over the union of both key sets.
    pub fn add(&self, other: &SparseVector) -> SparseVector {
        let mut sum = self.clone();
        sum.add_assign(other);
        sum
    }

    /// In-place form of [`SparseVector::add`].
    pub fn add_assign(&mut self, other: &SparseVector) {
        for (term, w) in &other.weights {
            *self.weights.entry(term.clone()).or_insert(0.0) += w;
        }
    }

    /// Accumulate `other * factor` without materializing the scaled copy.
    pub fn add_scaled(&mut self, other: &SparseVector, factor: f64) {
        for (term, w) in &other.weights {
            *self.weights.entry(term.clone()).or_insert(0.0) += w * factor;
        }
    }

    /// Inner product over the keys present in both vectors.
    ///
    /// Complexity: O(min(len₁, len₂))
    pub fn dot(&self, other: &SparseVector) -> f64 {
        // Iterate over the smaller vector
        let (smaller, larger) = if self.weights.len() <= other.weights.len() {
            (&self.weights, &other.weights)
        } else {
            (&other.weights, &self.weights)
        };

        smaller
            .iter()
            .filter_map(|(term, w1)| larger.get(term).map(|w2| w1 * w2))
            .sum()
    }

    /// L2 norm: sqrt(sum(w²))
    pub fn norm(&self) -> f64 {
        self.squared_norm().sqrt()
    }

    pub fn squared_norm(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum()
    }

    /// Largest absolute weight, 0.0 for an empty vector.
    pub fn max_abs_weight(&self) -> f64 {
        self.weights.values().fold(0.0, |acc, w| acc.max(w.abs()))
    }

    /// True when every weight is within `tolerance` of zero.
    pub fn is_zero(&self, tolerance: f64) -> bool {
        self.weights.values().all(|w| w.abs() <= tolerance)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().map(|(k, w)| (k.into(), w)).collect(),
        }
    }
}
