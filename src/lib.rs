pub mod artifact;
pub mod cli;
pub mod config;
pub mod discover;
pub mod document;
pub mod error;
pub mod extract;
pub mod logging;
pub mod pipeline;
pub mod route;
pub mod search;
pub mod versions;

pub use artifact::{ClientConfig, SearchIndexFile};
pub use config::{IndexConfig, SearchOptions};
pub use document::{Document, DocumentMetadata, ExtractedPage, Section};
pub use error::{ConfigError, Error, IntegrityError, Result};
pub use extract::{HtmlExtractor, PageExtractor};
pub use pipeline::{BuildContext, BuildOutput, build};
pub use route::{Category, RouteEntry, RouteRules};
