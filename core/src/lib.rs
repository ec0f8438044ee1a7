//! TF-IDF relevance scoring over an append-only corpus.
//!
//! Documents are registered with [`TfIdfCalculator::add_document`] and later
//! texts are scored against everything seen so far with
//! [`TfIdfCalculator::score`]. Scores are finite for every input.

pub mod calculator;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod scorer;
pub mod storage;
pub mod tokenizer;

/// A lowercase run of alphanumeric code points.
pub type Term = String;

pub use calculator::TfIdfCalculator;
pub use error::{Error, Result};
pub use fingerprint::compute_fingerprint;
pub use index::{CorpusIndex, CorpusStats};
pub use scorer::ScoreBreakdown;
pub use storage::{Connection, ConnectionProvider, DocumentRecord, SharedConnection, StoreMeta};
