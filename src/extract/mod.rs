//! Page-to-sections extraction.

mod html;

pub use html::HtmlExtractor;

use crate::document::ExtractedPage;
use crate::error::Result;
use crate::route::Category;

/// Turns the raw content of one output page into titled sections.
///
/// Implementations must be deterministic: the same input always yields the same page.
pub trait PageExtractor: Send + Sync {
    fn extract(&self, html: &str, category: Category, url: &str) -> Result<ExtractedPage>;
}

impl<F> PageExtractor for F
where
    F: Fn(&str, Category, &str) -> Result<ExtractedPage> + Send + Sync,
{
    fn extract(&self, html: &str, category: Category, url: &str) -> Result<ExtractedPage> {
        self(html, category, url)
    }
}
