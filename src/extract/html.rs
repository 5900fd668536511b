//! Regex-based extractor for statically generated HTML.
//!
//! Understands the markup most static-site generators emit: one `<h1>` page
//! title, headings carrying `id` anchors, breadcrumb navigation for docs pages,
//! and a `docsearch:version` meta tag on versioned docs.

use super::PageExtractor;
use crate::document::{ExtractedPage, Section};
use crate::error::{Error, Result};
use crate::route::Category;
use regex::Regex;
use std::sync::OnceLock;

/// Meta tag carrying the docs version of a page.
const VERSION_META: &str = "docsearch:version";

struct Patterns {
    noise: Regex,
    h1: Regex,
    title: Regex,
    article: Regex,
    body: Regex,
    heading: Regex,
    meta: Regex,
    attribute: Regex,
    breadcrumbs: Regex,
    list_item: Regex,
    tag: Regex,
    entity: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |pattern: &str| Regex::new(pattern).expect("static pattern");
        Patterns {
            noise: re(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->"),
            h1: re(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>"),
            title: re(r"(?is)<title\b[^>]*>(.*?)</title\s*>"),
            article: re(r"(?is)<article\b[^>]*>(.*)</article\s*>"),
            body: re(r"(?is)<body\b[^>]*>(.*)</body\s*>"),
            heading: re(r"(?is)<h[2-6]\b([^>]*)>(.*?)</h[2-6]\s*>"),
            meta: re(r"(?is)<meta\b([^>]*)>"),
            attribute: re(r#"(?is)([a-z][a-z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#),
            breadcrumbs: re(
                r#"(?is)<(nav|ul|ol)\b[^>]*(?:aria-label\s*=\s*["']breadcrumbs?["']|class\s*=\s*["'][^"']*\bbreadcrumbs\b[^"']*["'])[^>]*>(.*?)</(?:nav|ul|ol)\s*>"#,
            ),
            list_item: re(r"(?is)<li\b[^>]*>(.*?)</li\s*>"),
            tag: re(r"(?s)<[^>]*>"),
            entity: re(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);"),
            whitespace: re(r"\s+"),
        }
    })
}

/// Reads a named attribute out of the inside of a start tag.
fn attribute(attrs: &str, name: &str) -> Option<String> {
    patterns()
        .attribute
        .captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|value| decode_entities(value.as_str()))
}

fn decode_entities(text: &str) -> String {
    patterns()
        .entity
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    "ndash" => Some('\u{2013}'),
                    "mdash" => Some('\u{2014}'),
                    "hellip" => Some('\u{2026}'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Strips markup and collapses whitespace.
fn text(fragment: &str) -> String {
    let p = patterns();
    let stripped = p.tag.replace_all(fragment, " ");
    let decoded = decode_entities(&stripped);
    p.whitespace.replace_all(decoded.trim(), " ").into_owned()
}

/// Heading text without permalink markers.
fn heading_text(fragment: &str) -> String {
    text(fragment)
        .trim_end_matches(|c: char| c == '#' || c == '\u{200b}' || c.is_whitespace())
        .to_string()
}

/// Default [`PageExtractor`] for generated HTML pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    fn page_title(html: &str) -> String {
        let p = patterns();
        p.h1.captures(html)
            .map(|caps| heading_text(&caps[1]))
            .filter(|title| !title.is_empty())
            .or_else(|| p.title.captures(html).map(|caps| text(&caps[1])))
            .unwrap_or_default()
    }

    fn content_region(html: &str) -> &str {
        let p = patterns();
        p.article
            .captures(html)
            .or_else(|| p.body.captures(html))
            .and_then(|caps| caps.get(1))
            .map_or(html, |m| m.as_str())
    }

    fn doc_version(html: &str) -> Option<String> {
        patterns().meta.captures_iter(html).find_map(|caps| {
            let attrs = &caps[1];
            (attribute(attrs, "name").as_deref() == Some(VERSION_META))
                .then(|| attribute(attrs, "content"))
                .flatten()
        })
    }

    /// Breadcrumb labels, innermost first, excluding the page itself.
    fn categories(html: &str) -> Option<Vec<String>> {
        let p = patterns();
        let caps = p.breadcrumbs.captures(html)?;
        let mut labels: Vec<String> = p
            .list_item
            .captures_iter(&caps[2])
            .map(|item| text(&item[1]))
            .filter(|label| !label.is_empty())
            .collect();
        labels.pop();
        labels.reverse();
        Some(labels)
    }

    fn sections(region: &str, page_title: &str) -> Vec<Section> {
        let p = patterns();
        let region = p.h1.replace_all(region, " ");

        let mut sections = vec![];
        let mut current = Section {
            title: page_title.to_string(),
            hash: String::new(),
            content: String::new(),
        };
        let mut pending = String::new();
        let mut cursor = 0;

        for caps in p.heading.captures_iter(&region) {
            let Some(whole) = caps.get(0) else { continue };
            pending.push_str(&region[cursor..whole.start()]);
            cursor = whole.end();

            match attribute(&caps[1], "id").filter(|id| !id.is_empty()) {
                Some(id) => {
                    current.content = text(&pending);
                    pending.clear();
                    let next = Section {
                        title: heading_text(&caps[2]),
                        hash: format!("#{id}"),
                        content: String::new(),
                    };
                    sections.push(std::mem::replace(&mut current, next));
                }
                // Unanchored headings cannot be linked to; keep them as body text.
                None => {
                    pending.push(' ');
                    pending.push_str(&caps[2]);
                    pending.push(' ');
                }
            }
        }
        pending.push_str(&region[cursor..]);
        current.content = text(&pending);
        sections.push(current);

        sections
            .into_iter()
            .filter(|section| {
                if section.hash.is_empty() {
                    !section.content.is_empty()
                } else {
                    !(section.title.is_empty() && section.content.is_empty())
                }
            })
            .collect()
    }
}

impl PageExtractor for HtmlExtractor {
    fn extract(&self, html: &str, category: Category, url: &str) -> Result<ExtractedPage> {
        if html.trim().is_empty() {
            return Err(Error::Extract {
                url: url.to_string(),
                reason: "page is empty".to_string(),
            });
        }

        let cleaned = patterns().noise.replace_all(html, " ");
        let page_title = Self::page_title(&cleaned);
        let sections = Self::sections(Self::content_region(&cleaned), &page_title);

        let (sidebar_parent_categories, doc_version) = if category == Category::Docs {
            (Self::categories(&cleaned), Self::doc_version(&cleaned))
        } else {
            (None, None)
        };

        tracing::debug!("Extracted {} sections from {}", sections.len(), url);

        Ok(ExtractedPage {
            page_title,
            sections,
            sidebar_parent_categories,
            doc_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    const DOC_PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>Installation | My Site</title>
  <meta name="docsearch:version" content="2.0">
  <style>.x { color: red; }</style>
</head>
<body>
  <nav class="navbar">Home Docs Blog</nav>
  <nav aria-label="Breadcrumbs">
    <ul class="breadcrumbs">
      <li><a href="/"><svg></svg></a></li>
      <li><a href="/docs/guides">Guides</a></li>
      <li><a href="/docs/guides/setup">Setup</a></li>
      <li><span>Installation</span></li>
    </ul>
  </nav>
  <article>
    <header><h1>Installation</h1></header>
    <p>Install the tool &amp; run it.</p>
    <script>console.log("ignored")</script>
    <h2 id="linux">Linux<a class="hash-link" href="#linux">#</a></h2>
    <p>Use   the <code>apt</code> package.</p>
    <h3>Notes</h3>
    <p>Needs root.</p>
    <h2 id="windows">Windows &#8203;</h2>
    <p>Use the installer.</p>
  </article>
  <footer>Copyright</footer>
</body>
</html>"##;

    #[test]
    fn test_docs_page() {
        let page = HtmlExtractor
            .extract(DOC_PAGE, Category::Docs, "/docs/guides/setup/install")
            .unwrap();

        check!(page.page_title == "Installation");
        check!(page.doc_version.as_deref() == Some("2.0"));
        check!(page.sidebar_parent_categories == Some(vec!["Setup".to_string(), "Guides".to_string()]));

        let hashes: Vec<&str> = page.sections.iter().map(|s| s.hash.as_str()).collect();
        check!(hashes == vec!["", "#linux", "#windows"]);

        check!(page.sections[0].title == "Installation");
        check!(page.sections[0].content == "Install the tool & run it.");
        check!(page.sections[1].title == "Linux");
        check!(page.sections[1].content == "Use the apt package. Notes Needs root.");
        check!(page.sections[2].title == "Windows");
        check!(page.sections[2].content == "Use the installer.");
    }

    #[test]
    fn test_blog_page_has_no_docs_metadata() {
        let page = HtmlExtractor.extract(DOC_PAGE, Category::Blog, "/blog/post").unwrap();
        check!(page.doc_version.is_none());
        check!(page.sidebar_parent_categories.is_none());
        check!(page.sections.len() == 3);
    }

    #[test]
    fn test_title_falls_back_to_title_tag() {
        let html = "<html><head><title>About us</title></head><body><p>Hello</p></body></html>";
        let page = HtmlExtractor.extract(html, Category::Page, "/about").unwrap();
        check!(page.page_title == "About us");
        check!(page.sections.len() == 1);
        check!(page.sections[0].title == "About us");
        check!(page.sections[0].content == "Hello");
    }

    #[test]
    fn test_empty_preamble_dropped() {
        let html = r#"<body><h1>T</h1><h2 id="a">A</h2><p>x</p></body>"#;
        let page = HtmlExtractor.extract(html, Category::Page, "/t").unwrap();
        check!(page.sections.len() == 1);
        check!(page.sections[0].hash == "#a");
    }

    #[test]
    fn test_empty_page_is_error() {
        let_assert!(Err(Error::Extract { url, .. }) = HtmlExtractor.extract("  \n", Category::Page, "/x"));
        check!(url == "/x");
    }

    #[rstest]
    #[case("a &lt;b&gt; c", "a <b> c")]
    #[case("&#65;&#x42;", "AB")]
    #[case("&unknown; &amp;", "&unknown; &")]
    fn test_decode_entities(#[case] input: &str, #[case] expected: &str) {
        check!(decode_entities(input) == expected);
    }
}
