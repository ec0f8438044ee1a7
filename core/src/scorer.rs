use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::index::CorpusIndex;
use crate::Term;

/// A score together with the counts it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score: f64,
    /// Terms extracted from the scored text, repeats included.
    pub term_count: usize,
    pub distinct_terms: usize,
    /// Corpus size the score was computed against.
    pub document_count: u64,
}

/// Smoothed inverse document frequency: `ln((1 + n) / (1 + df)) + 1`.
///
/// Finite and positive for every `n >= 0`, `df >= 0`.
#[inline]
pub fn smoothed_idf(num_docs: u64, df: u64) -> f64 {
    ((1.0 + num_docs as f64) / (1.0 + df as f64)).ln() + 1.0
}

/// IDF of `term` against the current state of `index`.
pub fn idf(index: &CorpusIndex, term: &str) -> f64 {
    smoothed_idf(index.size(), index.frequency_of(term))
}

/// Sum of `tf * idf` over the distinct terms of a tokenized document.
///
/// `tf` is the raw occurrence count in the document. Terms are summed in
/// sorted order so equal inputs give bit-identical scores. An empty document
/// scores 0.0.
pub fn score_terms(index: &CorpusIndex, terms: &[Term]) -> ScoreBreakdown {
    let mut tf: BTreeMap<&str, u32> = BTreeMap::new();
    for term in terms {
        *tf.entry(term.as_str()).or_insert(0) += 1;
    }
    let n = index.size();
    let score = tf
        .iter()
        .map(|(term, &count)| count as f64 * smoothed_idf(n, index.frequency_of(term)))
        .fold(0.0, |acc, w| acc + w);
    ScoreBreakdown { score, term_count: terms.len(), distinct_terms: tf.len(), document_count: n }
}
