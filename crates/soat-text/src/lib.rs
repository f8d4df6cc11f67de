//! soat-text
//!
//! Lexical retrieval engine: a tokenizer and a TF-IDF similarity index ranking
//! chunks by cosine similarity against a query.
pub mod index;
pub mod tokenize;

pub use index::{ScoredChunk, TfIdfIndex};
pub use tokenize::Tokenizer;
