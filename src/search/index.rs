//! BM25 inverted index over weighted document fields.

use super::scoring::Bm25Params;
use super::tokenize::{Tokenizer, TokenizerSpec};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Version of the serialized index layout.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// A searchable document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    Content,
    Version,
    SidebarParentCategories,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Version => "version",
            Self::SidebarParentCategories => "sidebarParentCategories",
        })
    }
}

/// A declared field and its boost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: Field,
    pub boost: f64,
}

/// One term occurrence summary: which document, which field, how strongly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// Document reference (string form of the document id).
    #[serde(rename = "ref")]
    pub reference: String,
    pub field: Field,
    pub tf: u32,
    /// Boosted BM25 weight of this term in this field.
    pub score: f64,
}

/// Per-field contribution to a search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub term: String,
    pub field: Field,
    pub score: f64,
}

/// A scored search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub reference: String,
    pub score: f64,
    pub matches: Vec<FieldMatch>,
}

/// Query-time restrictions.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Only return documents indexed under this version.
    pub version: Option<String>,
    pub limit: Option<usize>,
}

/// The built, immutable search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndex {
    pub format_version: u32,
    pub pipeline: TokenizerSpec,
    pub params: Bm25Params,
    pub fields: Vec<FieldSpec>,
    /// Document references in insertion (ascending id) order.
    pub refs: Vec<String>,
    /// Raw docs version of each reference, parallel to `refs`.
    #[serde(default)]
    pub versions: Vec<Option<String>>,
    pub inverted_index: BTreeMap<String, Vec<Posting>>,
}

impl SearchIndex {
    /// Postings for an already-tokenized term.
    pub fn postings(&self, term: &str) -> &[Posting] {
        self.inverted_index.get(term).map_or(&[], Vec::as_slice)
    }

    pub fn term_count(&self) -> usize {
        self.inverted_index.len()
    }

    pub fn document_count(&self) -> usize {
        self.refs.len()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }

    /// Binds the frozen tokenizer so the index can answer queries.
    pub fn searcher(&self) -> Result<Searcher<'_>, ConfigError> {
        let tokenizer = Tokenizer::from_spec(&self.pipeline)?;
        let positions = self
            .refs
            .iter()
            .enumerate()
            .map(|(i, r)| (r.as_str(), i))
            .collect();
        Ok(Searcher {
            index: self,
            tokenizer,
            positions,
        })
    }
}

/// Query engine over a [`SearchIndex`].
#[derive(Debug)]
pub struct Searcher<'a> {
    index: &'a SearchIndex,
    tokenizer: Tokenizer,
    positions: HashMap<&'a str, usize>,
}

impl Searcher<'_> {
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        self.search_with(query, &QueryOptions::default())
    }

    /// Tokenizes the query like indexed text and sums per-field weights per document.
    /// Hits sort by score descending, then by insertion order.
    pub fn search_with(&self, query: &str, options: &QueryOptions) -> Vec<SearchHit> {
        let mut terms = self.tokenizer.tokenize(query);
        terms.sort();
        terms.dedup();

        let allowed = options.version.as_deref().map(|v| self.version_refs(v));

        let mut hits: HashMap<&str, SearchHit> = HashMap::new();
        for term in &terms {
            for posting in self.index.postings(term) {
                if allowed
                    .as_ref()
                    .is_some_and(|refs| !refs.contains(posting.reference.as_str()))
                {
                    continue;
                }
                let hit = hits
                    .entry(posting.reference.as_str())
                    .or_insert_with(|| SearchHit {
                        reference: posting.reference.clone(),
                        score: 0.0,
                        matches: vec![],
                    });
                hit.score += posting.score;
                hit.matches.push(FieldMatch {
                    term: term.clone(),
                    field: posting.field,
                    score: posting.score,
                });
            }
        }

        let mut results: Vec<SearchHit> = hits.into_values().collect();
        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| self.position(&a.reference).cmp(&self.position(&b.reference)))
        });
        if let Some(limit) = options.limit {
            results.truncate(limit);
        }
        results
    }

    fn position(&self, reference: &str) -> usize {
        self.positions.get(reference).copied().unwrap_or(usize::MAX)
    }

    /// References indexed under exactly `version`.
    fn version_refs(&self, version: &str) -> ahash::AHashSet<&str> {
        self.index
            .refs
            .iter()
            .zip(&self.index.versions)
            .filter(|(_, v)| v.as_deref() == Some(version))
            .map(|(r, _)| r.as_str())
            .collect()
    }
}
