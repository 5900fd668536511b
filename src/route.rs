//! Route classification: decides which output routes are indexed, and as what.

use crate::error::{IntegrityError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Index category of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Blog,
    Docs,
    Page,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Blog => "blog",
            Self::Docs => "docs",
            Self::Page => "page",
        })
    }
}

/// A route selected for indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Route relative to the site base URL, without a leading `/`.
    pub route: String,
    /// Full route as served, including the base URL.
    pub url: String,
    pub category: Category,
}

impl RouteEntry {
    /// Output file holding this route's rendered page.
    pub fn file_path(&self, out_dir: &Path, trailing_slash: bool) -> PathBuf {
        let route = self.route.trim_end_matches('/');
        if route.is_empty() {
            out_dir.join("index.html")
        } else if trailing_slash {
            out_dir.join(route).join("index.html")
        } else {
            out_dir.join(format!("{}.html", route))
        }
    }
}

/// Returns true when `route` is `prefix` or lies beneath it.
///
/// An empty prefix matches every route. `prefix` must not end with `/`.
pub fn url_matches_prefix(route: &str, prefix: &str) -> bool {
    assert!(
        !prefix.ends_with('/'),
        "url prefix must not end with '/': {prefix:?}"
    );
    prefix.is_empty()
        || route == prefix
        || route
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Which categories are indexed and where they live.
#[derive(Debug, Clone)]
pub struct RouteRules {
    pub base_url: String,
    pub index_docs: bool,
    pub docs_base_path: String,
    pub index_blog: bool,
    pub blog_base_path: String,
    pub index_pages: bool,
    pub ignore: Vec<Regex>,
}

impl RouteRules {
    fn error_page(&self) -> String {
        format!("{}404.html", self.base_url)
    }

    /// Classifies a full route. `Ok(None)` means the route is not indexed.
    pub fn classify(&self, url: &str) -> Result<Option<RouteEntry>> {
        if url == self.error_page() {
            return Ok(None);
        }

        let relative = url.strip_prefix(self.base_url.as_str()).ok_or_else(|| {
            IntegrityError::RouteOutsideBaseUrl {
                route: url.to_string(),
                base_url: self.base_url.clone(),
            }
        })?;
        let route = relative.trim_end_matches('/');

        if let Some(pattern) = self.ignore.iter().find(|p| p.is_match(route)) {
            debug!("Skipping route '{}' (ignored by '{}')", url, pattern);
            return Ok(None);
        }

        let category = if self.index_blog && url_matches_prefix(route, &self.blog_base_path) {
            let tags = if self.blog_base_path.is_empty() {
                "tags".to_string()
            } else {
                format!("{}/tags", self.blog_base_path)
            };
            if route == self.blog_base_path || url_matches_prefix(route, &tags) {
                debug!("Skipping blog listing route '{}'", url);
                return Ok(None);
            }
            Category::Blog
        } else if self.index_docs && url_matches_prefix(route, &self.docs_base_path) {
            Category::Docs
        } else if self.index_pages {
            Category::Page
        } else {
            return Ok(None);
        };

        Ok(Some(RouteEntry {
            route: relative.to_string(),
            url: url.to_string(),
            category,
        }))
    }

    /// Classifies every route, keeping the input order.
    pub fn classify_all<S: AsRef<str>>(&self, urls: &[S]) -> Result<Vec<RouteEntry>> {
        let mut entries = Vec::with_capacity(urls.len());
        for url in urls {
            if let Some(entry) = self.classify(url.as_ref())? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}
