//! Page and document records flowing through the pipeline.

use crate::route::Category;
use serde::{Deserialize, Serialize};

/// One heading-anchored fragment of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// Anchor including the leading `#`, or empty for the page preamble.
    pub hash: String,
    pub content: String,
}

/// Output of the extraction service for a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPage {
    pub page_title: String,
    pub sections: Vec<Section>,
    /// Sidebar category chain, innermost first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_parent_categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_version: Option<String>,
}

/// The unit stored in the index: one section of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: u32,
    pub page_title: String,
    pub page_route: String,
    pub section_route: String,
    pub section_title: String,
    pub section_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_parent_categories: Option<Vec<String>>,
}

impl Document {
    /// The string form of `id`, used as the index reference.
    pub fn reference(&self) -> String {
        self.id.to_string()
    }

    /// Lightweight record written next to the index.
    pub fn metadata(&self, version_aware: bool) -> DocumentMetadata {
        DocumentMetadata {
            id: self.id,
            page_title: self.page_title.clone(),
            section_title: self.section_title.clone(),
            section_route: self.section_route.clone(),
            doc_version: if version_aware {
                self.doc_version.clone()
            } else {
                None
            },
        }
    }
}

/// Per-document metadata shipped with the serialized index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub id: u32,
    pub page_title: String,
    pub section_title: String,
    pub section_route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_version: Option<String>,
}

/// Assembly settings that shape documents from extracted pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyOptions {
    pub version_aware: bool,
    pub category_depth: usize,
    pub parent_categories_in_title: bool,
}

/// Hands out dense, strictly increasing document ids starting at 1.
#[derive(Debug)]
pub struct IdCounter {
    next: u32,
}

impl Default for IdCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdCounter {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids issued so far.
    pub const fn issued(&self) -> u32 {
        self.next - 1
    }
}

/// Turns one extracted page into documents, one per section, drawing ids from `ids`.
pub fn assemble(
    page: ExtractedPage,
    category: Category,
    url: &str,
    options: AssemblyOptions,
    ids: &mut IdCounter,
) -> Vec<Document> {
    let categories = if options.category_depth > 0 {
        page.sidebar_parent_categories.clone()
    } else {
        None
    };

    let page_title = match (&page.sidebar_parent_categories, category) {
        (Some(chain), Category::Docs) if options.parent_categories_in_title && !chain.is_empty() => {
            let mut parts: Vec<&str> = chain.iter().rev().map(String::as_str).collect();
            parts.push(&page.page_title);
            parts.join(" > ")
        }
        _ => page.page_title.clone(),
    };

    let doc_version = if options.version_aware {
        page.doc_version.clone()
    } else {
        None
    };

    page.sections
        .into_iter()
        .map(|section| Document {
            id: ids.next_id(),
            page_title: page_title.clone(),
            page_route: url.to_string(),
            section_route: format!("{}{}", url, section.hash),
            section_title: section.title,
            section_content: section.content,
            doc_version: doc_version.clone(),
            sidebar_parent_categories: categories.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn page() -> ExtractedPage {
        ExtractedPage {
            page_title: "Install".to_string(),
            sections: vec![
                Section {
                    title: "Install".to_string(),
                    hash: String::new(),
                    content: "Getting started".to_string(),
                },
                Section {
                    title: "Linux".to_string(),
                    hash: "#linux".to_string(),
                    content: "apt install".to_string(),
                },
            ],
            sidebar_parent_categories: Some(vec!["Setup".to_string(), "Guides".to_string()]),
            doc_version: Some("2.0".to_string()),
        }
    }

    #[test]
    fn test_ids_are_dense_across_pages() {
        let mut ids = IdCounter::default();
        let options = AssemblyOptions::default();
        let first = assemble(page(), Category::Docs, "/docs/install", options, &mut ids);
        let second = assemble(page(), Category::Blog, "/blog/post", options, &mut ids);

        let all: Vec<u32> = first.iter().chain(&second).map(|d| d.id).collect();
        check!(all == vec![1, 2, 3, 4]);
        check!(ids.issued() == 4);
    }

    #[test]
    fn test_section_route_appends_hash() {
        let mut ids = IdCounter::default();
        let docs = assemble(page(), Category::Docs, "/docs/install", AssemblyOptions::default(), &mut ids);
        check!(docs[0].section_route == "/docs/install");
        check!(docs[1].section_route == "/docs/install#linux");
        check!(docs[1].page_route == "/docs/install");
    }

    #[test]
    fn test_optional_fields_follow_options() {
        let mut ids = IdCounter::default();
        let docs = assemble(page(), Category::Docs, "/d", AssemblyOptions::default(), &mut ids);
        check!(docs[0].doc_version.is_none());
        check!(docs[0].sidebar_parent_categories.is_none());

        let options = AssemblyOptions {
            version_aware: true,
            category_depth: 1,
            parent_categories_in_title: false,
        };
        let docs = assemble(page(), Category::Docs, "/d", options, &mut ids);
        check!(docs[0].doc_version.as_deref() == Some("2.0"));
        check!(docs[0].sidebar_parent_categories.as_ref().map(Vec::len) == Some(2));
        check!(docs[0].metadata(true).doc_version.as_deref() == Some("2.0"));
        check!(docs[0].metadata(false).doc_version.is_none());
    }

    #[test]
    fn test_parent_categories_in_title() {
        let mut ids = IdCounter::default();
        let options = AssemblyOptions {
            parent_categories_in_title: true,
            ..AssemblyOptions::default()
        };
        let docs = assemble(page(), Category::Docs, "/d", options, &mut ids);
        check!(docs[0].page_title == "Guides > Setup > Install");

        let blog = assemble(page(), Category::Blog, "/b", options, &mut ids);
        check!(blog[0].page_title == "Install");
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let mut ids = IdCounter::default();
        let docs = assemble(page(), Category::Page, "/p", AssemblyOptions::default(), &mut ids);
        let json = serde_json::to_value(docs[1].metadata(false)).unwrap();
        check!(json["sectionRoute"] == "/p#linux");
        check!(json.get("docVersion").is_none());
    }
}
