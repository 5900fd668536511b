//! Incremental construction of a [`SearchIndex`].

use super::index::{Field, FieldSpec, INDEX_FORMAT_VERSION, Posting, SearchIndex};
use super::scoring::{Bm25Params, idf, round_score};
use super::tokenize::{Tokenizer, TokenizerSpec};
use crate::document::Document;
use crate::error::{IntegrityError, Result};
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Field layout and weighting for one build.
#[derive(Debug, Clone)]
pub struct IndexSchema {
    pub params: Bm25Params,
    pub title_boost: f64,
    pub content_boost: f64,
    pub parent_categories_boost: f64,
    pub version_aware: bool,
    /// Maximum number of sidebar categories indexed; 0 disables the field.
    pub category_depth: usize,
}

impl IndexSchema {
    /// Boost for the version field; versions are matched, not ranked.
    pub const VERSION_BOOST: f64 = 1.0;

    pub fn fields(&self) -> Vec<FieldSpec> {
        let mut fields = vec![
            FieldSpec {
                name: Field::Title,
                boost: self.title_boost,
            },
            FieldSpec {
                name: Field::Content,
                boost: self.content_boost,
            },
        ];
        if self.version_aware {
            fields.push(FieldSpec {
                name: Field::Version,
                boost: Self::VERSION_BOOST,
            });
        }
        if self.category_depth > 0 {
            fields.push(FieldSpec {
                name: Field::SidebarParentCategories,
                boost: self.parent_categories_boost,
            });
        }
        fields
    }
}

/// Joins a category chain for indexing: outermost category first, at most `depth` entries.
pub fn category_chain_text(chain: &[String], depth: usize) -> String {
    chain
        .iter()
        .rev()
        .take(depth)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builder for accumulating term frequencies before BM25 finalization.
///
/// Owned by a single thread; documents must arrive in ascending id order.
#[derive(Debug)]
pub struct IndexBuilder {
    tokenizer: Tokenizer,
    pipeline: TokenizerSpec,
    schema: IndexSchema,
    fields: Vec<FieldSpec>,
    refs: Vec<String>,
    versions: Vec<Option<String>>,
    last_id: Option<u32>,
    /// Token count per document (row) and declared field (column).
    field_lengths: Vec<Vec<u32>>,
    /// term -> (document position, field position, term frequency)
    term_docs: AHashMap<String, Vec<(usize, usize, u32)>>,
}

impl IndexBuilder {
    /// Registers the tokenizer pipeline and freezes the field layout.
    pub fn new(pipeline: TokenizerSpec, schema: IndexSchema) -> Result<Self> {
        let tokenizer = Tokenizer::from_spec(&pipeline)?;
        let fields = schema.fields();
        tracing::debug!(
            "Index pipeline registered for {:?}: {:?}, fields: {:?}",
            tokenizer.languages(),
            pipeline.registrations,
            fields.iter().map(|f| f.name).collect::<Vec<_>>()
        );
        Ok(Self {
            tokenizer,
            pipeline,
            schema,
            fields,
            refs: vec![],
            versions: vec![],
            last_id: None,
            field_lengths: vec![],
            term_docs: AHashMap::new(),
        })
    }

    /// Text indexed for `field`, or `None` if the document has nothing for it.
    fn field_text(&self, field: Field, doc: &Document) -> Option<String> {
        match field {
            Field::Title => Some(doc.section_title.clone()),
            Field::Content => Some(doc.section_content.clone()),
            Field::Version => doc.doc_version.clone(),
            Field::SidebarParentCategories => doc
                .sidebar_parent_categories
                .as_deref()
                .map(|chain| category_chain_text(chain, self.schema.category_depth)),
        }
    }

    /// Adds one document. Ids must be strictly increasing.
    pub fn add(&mut self, doc: &Document) -> Result<()> {
        if let Some(previous) = self.last_id
            && doc.id <= previous
        {
            return Err(IntegrityError::DocumentOrder {
                id: doc.id,
                previous,
            }
            .into());
        }
        self.last_id = Some(doc.id);

        let position = self.refs.len();
        self.refs.push(doc.reference());
        self.versions
            .push(doc.doc_version.clone().filter(|_| self.schema.version_aware));

        let mut lengths = Vec::with_capacity(self.fields.len());
        for (field_idx, spec) in self.fields.iter().enumerate() {
            let tokens = self
                .field_text(spec.name, doc)
                .map(|text| self.tokenizer.tokenize(&text))
                .unwrap_or_default();
            lengths.push(tokens.len() as u32);

            let mut counts: AHashMap<String, u32> = AHashMap::with_capacity(tokens.len());
            for token in tokens {
                *counts.entry(token).or_insert(0) += 1;
            }
            for (term, tf) in counts {
                self.term_docs
                    .entry(term)
                    .or_default()
                    .push((position, field_idx, tf));
            }
        }
        self.field_lengths.push(lengths);
        Ok(())
    }

    /// Computes BM25 weights and produces the final searchable index.
    pub fn finish(self) -> SearchIndex {
        let start = std::time::Instant::now();
        let total_docs = self.refs.len();

        let averages: Vec<f64> = (0..self.fields.len())
            .map(|field_idx| {
                if total_docs == 0 {
                    return 0.0;
                }
                let total: u64 = self
                    .field_lengths
                    .iter()
                    .map(|row| u64::from(row[field_idx]))
                    .sum();
                total as f64 / total_docs as f64
            })
            .collect();

        let total_pairs: usize = self.term_docs.values().map(Vec::len).sum();
        let mut inverted_index = BTreeMap::new();
        for (term, occurrences) in self.term_docs {
            let mut docs: Vec<usize> = occurrences.iter().map(|(doc, _, _)| *doc).collect();
            docs.dedup();
            let term_idf = idf(total_docs, docs.len());

            let postings: Vec<Posting> = occurrences
                .into_iter()
                .map(|(doc, field_idx, tf)| {
                    let spec = self.fields[field_idx];
                    let weight = self.schema.params.tf_weight(
                        tf,
                        self.field_lengths[doc][field_idx],
                        averages[field_idx],
                    );
                    Posting {
                        reference: self.refs[doc].clone(),
                        field: spec.name,
                        tf,
                        score: round_score(spec.boost * term_idf * weight),
                    }
                })
                .collect();
            inverted_index.insert(term, postings);
        }

        let index = SearchIndex {
            format_version: INDEX_FORMAT_VERSION,
            pipeline: self.pipeline,
            params: self.schema.params,
            fields: self.fields,
            refs: self.refs,
            versions: self.versions,
            inverted_index,
        };

        tracing::info!(
            "Built search index: {} unique terms, {} documents, {} term-field pairs in {:?}",
            index.term_count(),
            index.document_count(),
            total_pairs,
            start.elapsed()
        );

        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::search::index::QueryOptions;
    use assert2::{check, let_assert};
    use rstest::{fixture, rstest};

    #[fixture]
    fn schema() -> IndexSchema {
        IndexSchema {
            params: Bm25Params::default(),
            title_boost: 5.0,
            content_boost: 1.0,
            parent_categories_boost: 2.0,
            version_aware: false,
            category_depth: 0,
        }
    }

    fn doc(id: u32, title: &str, content: &str) -> Document {
        Document {
            id,
            page_title: title.to_string(),
            page_route: format!("/docs/{id}"),
            section_route: format!("/docs/{id}"),
            section_title: title.to_string(),
            section_content: content.to_string(),
            doc_version: None,
            sidebar_parent_categories: None,
        }
    }

    fn build(schema: IndexSchema, docs: &[Document]) -> SearchIndex {
        let mut builder = IndexBuilder::new(TokenizerSpec::english(), schema).unwrap();
        for d in docs {
            builder.add(d).unwrap();
        }
        builder.finish()
    }

    #[rstest]
    fn test_declares_core_fields_only(schema: IndexSchema) {
        let index = build(schema, &[doc(1, "Intro", "hello world")]);
        let names: Vec<Field> = index.fields.iter().map(|f| f.name).collect();
        check!(names == vec![Field::Title, Field::Content]);
    }

    #[rstest]
    fn test_declares_optional_fields(mut schema: IndexSchema) {
        schema.version_aware = true;
        schema.category_depth = 2;
        let index = build(schema, &[doc(1, "Intro", "hello world")]);
        check!(index.has_field(Field::Version));
        check!(index.has_field(Field::SidebarParentCategories));
    }

    #[rstest]
    fn test_references_are_string_ids(schema: IndexSchema) {
        let index = build(schema, &[doc(1, "Intro", "hello"), doc(2, "Next", "hello")]);
        check!(index.refs == vec!["1", "2"]);
        let refs: Vec<&str> = index.postings("hello").iter().map(|p| p.reference.as_str()).collect();
        check!(refs == vec!["1", "2"]);
    }

    #[rstest]
    fn test_out_of_order_ids_rejected(schema: IndexSchema) {
        let mut builder = IndexBuilder::new(TokenizerSpec::english(), schema).unwrap();
        builder.add(&doc(2, "b", "b")).unwrap();
        let_assert!(
            Err(Error::Integrity(IntegrityError::DocumentOrder { id: 1, previous: 2 })) =
                builder.add(&doc(1, "a", "a"))
        );
        let_assert!(Err(Error::Integrity(_)) = builder.add(&doc(2, "a", "a")));
    }

    #[rstest]
    fn test_title_hit_outranks_content_hit(schema: IndexSchema) {
        // Same field lengths, the term only swaps fields.
        let index = build(
            schema,
            &[
                doc(1, "serde guide", "intro text"),
                doc(2, "intro guide", "serde text"),
            ],
        );
        let searcher = index.searcher().unwrap();
        let hits = searcher.search("serde");
        check!(hits.len() == 2);
        check!(hits[0].reference == "1");
        check!(hits[0].score >= hits[1].score);
        check!(hits[0].matches[0].field == Field::Title);
        check!(hits[1].matches[0].field == Field::Content);
    }

    #[rstest]
    fn test_scores_combine_across_fields_and_terms(schema: IndexSchema) {
        let index = build(
            schema,
            &[
                doc(1, "tokio runtime", "tokio runtime internals"),
                doc(2, "runtime", "other words here"),
            ],
        );
        let searcher = index.searcher().unwrap();
        let hits = searcher.search("tokio runtime");
        check!(hits[0].reference == "1");
        check!(hits[0].matches.len() == 4);
        let sum: f64 = hits[0].matches.iter().map(|m| m.score).sum();
        check!((sum - hits[0].score).abs() < 1e-9);
    }

    #[rstest]
    fn test_category_chain_field(mut schema: IndexSchema) {
        schema.category_depth = 2;
        let mut d = doc(1, "Intro", "hello");
        d.sidebar_parent_categories = Some(vec!["a".into(), "b".into(), "c".into()]);
        let index = build(schema, &[d]);
        let fields: Vec<Field> = index.postings("c").iter().map(|p| p.field).collect();
        check!(fields == vec![Field::SidebarParentCategories]);
        check!(!index.postings("b").is_empty());
        check!(index.postings("a").is_empty());
    }

    #[test]
    fn test_category_chain_text_reverses_then_truncates() {
        let chain: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        check!(category_chain_text(&chain, 2) == "c b");
        check!(category_chain_text(&chain, 10) == "c b a");
        check!(category_chain_text(&chain, 0).is_empty());
    }

    #[rstest]
    fn test_version_filter(mut schema: IndexSchema) {
        schema.version_aware = true;
        let mut old = doc(1, "Install", "setup steps");
        old.doc_version = Some("1.0".into());
        let mut new = doc(2, "Install", "setup steps");
        new.doc_version = Some("next".into());
        let unversioned = doc(3, "Install", "blog words");

        let index = build(schema, &[old, new, unversioned]);
        let searcher = index.searcher().unwrap();
        check!(searcher.search("install").len() == 3);

        let options = QueryOptions {
            version: Some("next".into()),
            limit: None,
        };
        let hits = searcher.search_with("install", &options);
        let refs: Vec<&str> = hits.iter().map(|h| h.reference.as_str()).collect();
        check!(refs == vec!["2"]);
    }

    #[rstest]
    fn test_version_filter_matches_exact_version(mut schema: IndexSchema) {
        schema.version_aware = true;
        let versioned = |id, version: &str| {
            let mut d = doc(id, "Install", "setup steps");
            d.doc_version = Some(version.to_string());
            d
        };
        let index = build(
            schema,
            &[versioned(1, "2.0.0"), versioned(2, "2.0.0-beta.1"), versioned(3, "next")],
        );
        check!(index.versions.len() == index.refs.len());

        let searcher = index.searcher().unwrap();
        let refs_for = |version: &str| -> Vec<String> {
            let options = QueryOptions {
                version: Some(version.to_string()),
                limit: None,
            };
            searcher
                .search_with("install", &options)
                .into_iter()
                .map(|h| h.reference)
                .collect()
        };
        check!(refs_for("2.0.0") == vec!["1"]);
        check!(refs_for("2.0.0-beta.1") == vec!["2"]);
        check!(refs_for("2.0").is_empty());
    }

    #[rstest]
    fn test_versions_recorded_only_when_version_aware(schema: IndexSchema) {
        let mut d = doc(1, "Install", "setup");
        d.doc_version = Some("1.0".into());
        let index = build(schema, &[d]);
        check!(index.versions == vec![None]);
    }

    #[rstest]
    fn test_ties_keep_insertion_order_and_limit(schema: IndexSchema) {
        let docs: Vec<Document> = (1..=5).map(|id| doc(id, "same", "same body")).collect();
        let index = build(schema, &docs);
        let searcher = index.searcher().unwrap();
        let options = QueryOptions {
            version: None,
            limit: Some(3),
        };
        let refs: Vec<String> = searcher
            .search_with("same", &options)
            .into_iter()
            .map(|h| h.reference)
            .collect();
        check!(refs == vec!["1", "2", "3"]);
    }

    #[rstest]
    fn test_round_trip_preserves_ranking(schema: IndexSchema) {
        let index = build(
            schema,
            &[
                doc(1, "Getting started", "install the cli and run a build"),
                doc(2, "Configuration", "every option of the build configuration"),
                doc(3, "Build output", "files written by a build"),
            ],
        );
        let json = serde_json::to_string(&index).unwrap();
        let restored: SearchIndex = serde_json::from_str(&json).unwrap();
        check!(restored == index);

        let before = index.searcher().unwrap();
        let after = restored.searcher().unwrap();
        for query in ["build", "configuration option", "cli", "missing"] {
            check!(before.search(query) == after.search(query));
        }
    }

    #[rstest]
    fn test_empty_index(schema: IndexSchema) {
        let index = build(schema, &[]);
        check!(index.document_count() == 0);
        check!(index.searcher().unwrap().search("anything").is_empty());
    }
}
