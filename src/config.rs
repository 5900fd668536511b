//! Build options and their validation into an immutable [`IndexConfig`].
//!
//! Options are read from TOML (`sitedex.toml`); every key is optional:
//!
//! ```toml
//! language = ["en", "de"]
//! index_pages = true
//! docs_route_base_path = "/guide"
//! ignore_routes = ["^docs/internal"]
//! sidebar_category_depth = 2
//!
//! [ranking]
//! k1 = 1.2
//! b = 0.75
//! title_boost = 5.0
//! ```

use crate::document::AssemblyOptions;
use crate::error::{ConfigError, Error, Result};
use crate::route::RouteRules;
use crate::search::builder::IndexSchema;
use crate::search::scoring::{Bm25Params, check_range};
use crate::search::tokenize::{Language, TokenizerSpec};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Upper bound shared by all field boosts.
pub const MAX_BOOST: f64 = 100.0;

/// A single language code or an ordered list of codes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LanguageOption {
    One(String),
    Many(Vec<String>),
}

impl Default for LanguageOption {
    fn default() -> Self {
        Self::One("en".to_string())
    }
}

impl LanguageOption {
    pub fn codes(&self) -> &[String] {
        match self {
            Self::One(code) => std::slice::from_ref(code),
            Self::Many(codes) => codes,
        }
    }
}

/// Tokenizer and BM25 tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingOptions {
    pub tokenizer_separator: Option<String>,
    pub k1: f64,
    pub b: f64,
    pub title_boost: f64,
    pub content_boost: f64,
    pub parent_categories_boost: f64,
}

impl Default for RankingOptions {
    fn default() -> Self {
        let params = Bm25Params::default();
        Self {
            tokenizer_separator: None,
            k1: params.k1,
            b: params.b,
            title_boost: 5.0,
            content_boost: 1.0,
            parent_categories_boost: 2.0,
        }
    }
}

/// Raw user options, as written in the options file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchOptions {
    pub language: LanguageOption,
    pub index_docs: bool,
    pub index_blog: bool,
    pub index_pages: bool,
    pub docs_route_base_path: String,
    pub blog_route_base_path: String,
    /// Docs source directory, relative to the site directory.
    pub docs_dir: PathBuf,
    /// Regular expressions matched against routes relative to the base URL.
    pub ignore_routes: Vec<String>,
    pub sidebar_category_depth: usize,
    pub include_parent_categories_in_page_title: bool,
    pub remove_default_stop_word_filter: bool,
    pub remove_default_stemmer: bool,
    pub ranking: RankingOptions,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            language: LanguageOption::default(),
            index_docs: true,
            index_blog: true,
            index_pages: false,
            docs_route_base_path: "docs".to_string(),
            blog_route_base_path: "blog".to_string(),
            docs_dir: PathBuf::from("docs"),
            ignore_routes: vec![],
            sidebar_category_depth: 0,
            include_parent_categories_in_page_title: false,
            remove_default_stop_word_filter: false,
            remove_default_stemmer: false,
            ranking: RankingOptions::default(),
        }
    }
}

impl SearchOptions {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            Error::from(ConfigError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })
    }

    /// Reads an options file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&content, path)
    }

    /// Checks every option and resolves languages, separators and patterns.
    ///
    /// Runs before any route is classified; nothing is indexed if this fails.
    pub fn validate(&self) -> std::result::Result<IndexConfig, ConfigError> {
        let languages = self
            .language
            .codes()
            .iter()
            .map(|code| code.parse::<Language>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let tokenizer = TokenizerSpec::new(
            &languages,
            self.ranking.tokenizer_separator.as_deref(),
            !self.remove_default_stop_word_filter,
            !self.remove_default_stemmer,
        )?;

        let params = Bm25Params::new(self.ranking.k1, self.ranking.b)?;
        check_range("title_boost", self.ranking.title_boost, (0.0, MAX_BOOST))?;
        check_range("content_boost", self.ranking.content_boost, (0.0, MAX_BOOST))?;
        check_range(
            "parent_categories_boost",
            self.ranking.parent_categories_boost,
            (0.0, MAX_BOOST),
        )?;

        let docs_base_path = normalize_base_path("docs_route_base_path", &self.docs_route_base_path)?;
        let blog_base_path = normalize_base_path("blog_route_base_path", &self.blog_route_base_path)?;

        let ignore = self
            .ignore_routes
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidIgnorePattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(IndexConfig {
            tokenizer,
            params,
            title_boost: self.ranking.title_boost,
            content_boost: self.ranking.content_boost,
            parent_categories_boost: self.ranking.parent_categories_boost,
            category_depth: self.sidebar_category_depth,
            parent_categories_in_title: self.include_parent_categories_in_page_title,
            index_docs: self.index_docs,
            docs_base_path,
            index_blog: self.index_blog,
            blog_base_path,
            index_pages: self.index_pages,
            ignore,
            docs_dir: self.docs_dir.clone(),
            versions: None,
        })
    }
}

/// Strips the leading `/`; a trailing one is rejected.
fn normalize_base_path(name: &'static str, value: &str) -> std::result::Result<String, ConfigError> {
    let stripped = value.strip_prefix('/').unwrap_or(value);
    if stripped.ends_with('/') {
        return Err(ConfigError::TrailingSeparator {
            name,
            value: value.to_string(),
        });
    }
    Ok(stripped.to_string())
}

/// Validated, immutable configuration for one build.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub tokenizer: TokenizerSpec,
    pub params: Bm25Params,
    pub title_boost: f64,
    pub content_boost: f64,
    pub parent_categories_boost: f64,
    pub category_depth: usize,
    pub parent_categories_in_title: bool,
    pub index_docs: bool,
    pub docs_base_path: String,
    pub index_blog: bool,
    pub blog_base_path: String,
    pub index_pages: bool,
    pub ignore: Vec<Regex>,
    pub docs_dir: PathBuf,
    /// Known doc versions; `Some` turns on version-aware indexing.
    pub versions: Option<Vec<String>>,
}

impl IndexConfig {
    pub const fn version_aware(&self) -> bool {
        self.versions.is_some()
    }

    #[must_use]
    pub fn with_versions(mut self, versions: Option<Vec<String>>) -> Self {
        self.versions = versions;
        self
    }

    pub fn route_rules(&self, base_url: &str) -> RouteRules {
        RouteRules {
            base_url: base_url.to_string(),
            index_docs: self.index_docs,
            docs_base_path: self.docs_base_path.clone(),
            index_blog: self.index_blog,
            blog_base_path: self.blog_base_path.clone(),
            index_pages: self.index_pages,
            ignore: self.ignore.clone(),
        }
    }

    pub const fn assembly(&self) -> AssemblyOptions {
        AssemblyOptions {
            version_aware: self.version_aware(),
            category_depth: self.category_depth,
            parent_categories_in_title: self.parent_categories_in_title,
        }
    }

    pub const fn schema(&self) -> IndexSchema {
        IndexSchema {
            params: self.params,
            title_boost: self.title_boost,
            content_boost: self.content_boost,
            parent_categories_boost: self.parent_categories_boost,
            version_aware: self.version_aware(),
            category_depth: self.category_depth,
        }
    }
}
