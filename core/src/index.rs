use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tokenizer::tokenize_unique;
use crate::Term;

/// Point-in-time summary of a corpus, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub document_count: u64,
    pub vocabulary_size: usize,
}

/// Append-only document-frequency counters.
///
/// Only counts are kept, never the text. `df` values are always in
/// `1..=num_docs`, and neither field ever decreases.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    df: HashMap<Term, u64>,
    num_docs: u64,
}

impl CorpusIndex {
    pub fn new() -> Self { Self::default() }

    /// Tokenize `text` and count it as one more document.
    pub fn add_document(&mut self, text: &str) {
        self.add_terms(&tokenize_unique(text));
    }

    /// Count one document whose distinct terms are `terms`.
    ///
    /// Callers must pass each term at most once; `tokenize_unique` output
    /// satisfies this. An empty slice still counts as a document.
    pub fn add_terms<T: AsRef<str>>(&mut self, terms: &[T]) {
        self.num_docs += 1;
        for term in terms {
            let term = term.as_ref();
            match self.df.get_mut(term) {
                Some(count) => *count += 1,
                None => { self.df.insert(term.to_owned(), 1); }
            }
        }
    }

    /// Number of added documents containing `term`, 0 when unseen.
    pub fn frequency_of(&self, term: &str) -> u64 {
        self.df.get(term).copied().unwrap_or(0)
    }

    /// Number of documents ever added.
    pub fn size(&self) -> u64 { self.num_docs }

    pub fn vocabulary_size(&self) -> usize { self.df.len() }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats { document_count: self.num_docs, vocabulary_size: self.df.len() }
    }
}
