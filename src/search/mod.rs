//! Full-text search infrastructure for generated site pages.
//!
//! This module provides language-aware tokenization, BM25 index construction,
//! and query evaluation over the built index.

pub mod builder;
pub mod index;
pub mod scoring;
pub mod tokenize;

pub use builder::{IndexBuilder, IndexSchema, category_chain_text};
pub use index::{
    Field, FieldMatch, FieldSpec, INDEX_FORMAT_VERSION, Posting, QueryOptions, SearchHit,
    SearchIndex, Searcher,
};
pub use scoring::Bm25Params;
pub use tokenize::{Language, Segmentation, Tokenizer, TokenizerKind, TokenizerSpec};
