use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

use crate::Term;

lazy_static! {
    // Same character classes as `char::is_alphanumeric`.
    static ref RE: Regex = Regex::new(r"[\p{Alphabetic}\p{N}]+").expect("valid regex");
}

/// Case-fold `text` one code point at a time.
///
/// Lower, upper, then lower again: `ς`, `σ` and `Σ` all become `σ`, and `ß`,
/// `ẞ` and `SS` all become `ss`. Context-free, so every case variant of a
/// text folds to the same string with the same separators.
fn fold_case(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .flat_map(char::to_uppercase)
        .flat_map(char::to_lowercase)
        .collect()
}

/// Tokenize text into case-folded terms.
///
/// The text is NFKC-normalized, case-folded, normalized again, then split
/// on every code point that is not alphanumeric. Never fails: empty or
/// punctuation-only input yields an empty vector.
pub fn tokenize(text: &str) -> Vec<Term> {
    let folded = fold_case(&text.nfkc().collect::<String>());
    let normalized = folded.nfkc().collect::<String>();
    RE.find_iter(&normalized)
        .map(|mat| mat.as_str().to_owned())
        .collect()
}

/// Distinct terms of `text` in first-occurrence order.
pub fn tokenize_unique(text: &str) -> Vec<Term> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Occurrence count of every term in `text`.
pub fn term_counts(text: &str) -> HashMap<Term, u32> {
    let mut counts: HashMap<Term, u32> = HashMap::new();
    for term in tokenize(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}
