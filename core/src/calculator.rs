use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::index::{CorpusIndex, CorpusStats};
use crate::scorer::{self, ScoreBreakdown};
use crate::tokenizer::{tokenize, tokenize_unique};

/// TF-IDF calculator over a growing corpus, safe to share between threads.
///
/// Locking: one `RwLock` guards the document count and the df map together.
/// `add_document` holds the write guard for the whole update of both;
/// every read path holds one read guard for its whole computation, so a
/// score never mixes counters from before and after an addition.
/// Tokenization happens before the lock is taken.
#[derive(Debug, Default)]
pub struct TfIdfCalculator {
    index: RwLock<CorpusIndex>,
}

impl TfIdfCalculator {
    pub fn new() -> Self { Self::default() }

    /// Register `text` as one more corpus document.
    ///
    /// Returns the document count right after this addition, read under the
    /// same write guard, so concurrent additions never leak into it.
    pub fn add_document(&self, text: &str) -> u64 {
        let terms = tokenize_unique(text);
        let mut index = self.index.write();
        index.add_terms(&terms);
        let document_count = index.size();
        debug!(distinct_terms = terms.len(), document_count, "document added");
        document_count
    }

    /// Like [`add_document`](Self::add_document), rejecting an absent text.
    pub fn add_document_to_corpus(&self, text: Option<&str>) -> Result<()> {
        let text = text.ok_or(Error::InvalidArgument("document text"))?;
        self.add_document(text);
        Ok(())
    }

    /// TF-IDF score of `text` against the corpus. Always finite.
    pub fn score(&self, text: &str) -> f64 {
        self.score_breakdown(text).score
    }

    /// Like [`score`](Self::score), rejecting an absent text.
    pub fn calculate_document_tf_idf(&self, text: Option<&str>) -> Result<f64> {
        let text = text.ok_or(Error::InvalidArgument("document text"))?;
        Ok(self.score(text))
    }

    pub fn score_breakdown(&self, text: &str) -> ScoreBreakdown {
        let terms = tokenize(text);
        let breakdown = scorer::score_terms(&self.index.read(), &terms);
        debug!(
            terms = breakdown.term_count,
            document_count = breakdown.document_count,
            score = breakdown.score,
            "document scored"
        );
        breakdown
    }

    /// Smoothed IDF of an already-normalized term.
    pub fn idf(&self, term: &str) -> f64 {
        scorer::idf(&self.index.read(), term)
    }

    /// `(df, idf)` of `term` read under one guard.
    pub fn term_weight(&self, term: &str) -> (u64, f64) {
        let index = self.index.read();
        (index.frequency_of(term), scorer::idf(&index, term))
    }

    pub fn frequency_of(&self, term: &str) -> u64 {
        self.index.read().frequency_of(term)
    }

    pub fn document_count(&self) -> u64 {
        self.index.read().size()
    }

    pub fn stats(&self) -> CorpusStats {
        self.index.read().stats()
    }

    /// Copy of the current index.
    pub fn snapshot(&self) -> CorpusIndex {
        self.index.read().clone()
    }
}
