//! Linear-scan similarity index.
//!
//! Every query scores every stored vector. The corpus is small (hundreds to
//! low thousands of creators), and a full scan keeps ranking exact and ties
//! reproducible.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// How vectors are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    /// Dot product over the product of magnitudes, in `[-1, 1]`.
    #[default]
    Cosine,
    /// `1 / (1 + euclidean distance)`, in `(0, 1]`.
    Euclidean,
}

impl SimilarityMetric {
    #[must_use]
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::Euclidean => euclidean_similarity(a, b),
        }
    }
}

impl FromStr for SimilarityMetric {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "euclidean" => Ok(Self::Euclidean),
            other => Err(SearchError::Config(format!("unknown similarity metric: {other}"))),
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
        })
    }
}

/// Cosine similarity. 0 when either vector has zero magnitude or the lengths
/// differ.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(-1.0, 1.0) as f32
    }
}

/// Euclidean distance mapped to a similarity via `1 / (1 + d)`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn euclidean_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let distance = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum::<f64>()
        .sqrt();
    if distance.is_nan() {
        0.0
    } else {
        (1.0 / (1.0 + distance)) as f32
    }
}

/// A creator id with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub id: String,
    pub score: f32,
}

/// Order by descending score, then ascending id.
pub fn rank_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.id.cmp(&b.id))
}

/// In-memory `{id -> vector}` map searched by linear scan.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    vectors: BTreeMap<String, Vec<f32>>,
    metric: SimilarityMetric,
}

impl VectorIndex {
    #[must_use]
    pub fn new(metric: SimilarityMetric) -> Self {
        Self {
            vectors: BTreeMap::new(),
            metric,
        }
    }

    #[must_use]
    pub const fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Insert or replace the vector for `id`.
    pub fn insert(&mut self, id: impl Into<String>, vector: Vec<f32>) {
        self.vectors.insert(id.into(), vector);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&[f32]> {
        self.vectors.get(id).map(Vec::as_slice)
    }

    /// Score every vector, drop those below `threshold`, sort by
    /// [`rank_order`] and keep the best `top_k`.
    #[must_use]
    pub fn search(&self, query: &[f32], top_k: usize, threshold: f32) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = self
            .vectors
            .iter()
            .map(|(id, vector)| ScoredCandidate {
                id: id.clone(),
                score: self.metric.score(query, vector),
            })
            .filter(|candidate| candidate.score >= threshold)
            .collect();

        scored.sort_by(rank_order);
        scored.truncate(top_k);
        scored
    }
}

impl FromIterator<(String, Vec<f32>)> for VectorIndex {
    fn from_iter<T: IntoIterator<Item = (String, Vec<f32>)>>(iter: T) -> Self {
        let mut index = Self::new(SimilarityMetric::Cosine);
        for (id, vector) in iter {
            index.insert(id, vector);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_and_mismatch() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_euclidean_similarity() {
        assert!((euclidean_similarity(&[1.0, 1.0], &[1.0, 1.0]) - 1.0).abs() < 1e-6);
        // distance 5 -> 1/6
        assert!((euclidean_similarity(&[0.0, 0.0], &[3.0, 4.0]) - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_metric_parse() {
        assert_eq!("Cosine".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::Cosine);
        assert_eq!(
            "euclidean".parse::<SimilarityMetric>().unwrap(),
            SimilarityMetric::Euclidean
        );
        assert!("manhattan".parse::<SimilarityMetric>().is_err());
    }

    #[test]
    fn test_search_applies_threshold_before_top_k() {
        let mut index = VectorIndex::new(SimilarityMetric::Cosine);
        index.insert("exact", vec![1.0, 0.0]);
        index.insert("close", vec![0.9, 0.1]);
        index.insert("orthogonal", vec![0.0, 1.0]);
        index.insert("opposite", vec![-1.0, 0.0]);

        let results = index.search(&[1.0, 0.0], 10, 0.5);
        let ids: Vec<_> = results.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "close"]);

        let top1 = index.search(&[1.0, 0.0], 1, 0.5);
        assert_eq!(top1.len(), 1);
        assert_eq!(top1[0].id, "exact");
    }

    #[test]
    fn test_ties_break_by_id() {
        let mut index = VectorIndex::new(SimilarityMetric::Cosine);
        index.insert("b", vec![1.0, 0.0]);
        index.insert("c", vec![1.0, 0.0]);
        index.insert("a", vec![2.0, 0.0]);

        let ids: Vec<_> = index
            .search(&[1.0, 0.0], 3, 0.0)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_zero_vector_never_passes_positive_threshold() {
        let index: VectorIndex = vec![("z".to_string(), vec![0.0; 4])].into_iter().collect();
        assert!(index.search(&[1.0, 0.0, 0.0, 0.0], 5, 0.2).is_empty());
        assert_eq!(index.search(&[1.0, 0.0, 0.0, 0.0], 5, 0.0).len(), 1);
    }
}
