//! Shared test fixtures and utilities for integration tests.
//!
//! Each test gets a [`TestSite`]: a fresh temporary site root with a `build/`
//! output directory and a `docs/` source directory, so builds never share
//! artifacts.

use rstest::fixture;
use sitedex::{BuildContext, BuildOutput, HtmlExtractor, SearchOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A temporary workspace directory for test isolation.
///
/// Cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a directory (and all parent directories) within this workspace.
    pub fn create_dir(&self, path: &str) {
        let full_path = self.root.join(path);
        std::fs::create_dir_all(&full_path)
            .unwrap_or_else(|e| panic!("Failed to create directory '{}': {}", path, e));
    }

    /// Creates a file with the given content; parent directories are created as needed.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a generated page: an `<h1>` title, then one anchored `<h2>` per section.
#[allow(dead_code)]
pub fn page_html(title: &str, sections: &[(&str, &str)]) -> String {
    let mut body = format!("<h1>{title}</h1><p>{title} overview.</p>");
    for (heading, content) in sections {
        let id = heading.to_lowercase().replace(' ', "-");
        body.push_str(&format!("<h2 id=\"{id}\">{heading}</h2><p>{content}</p>"));
    }
    format!("<html><head><title>{title}</title></head><body><article>{body}</article></body></html>")
}

/// A site root with generated pages under `build/`.
#[allow(dead_code)]
pub struct TestSite {
    pub workspace: TempWorkspace,
    pub trailing_slash: bool,
}

#[allow(dead_code)]
impl TestSite {
    pub fn new() -> Self {
        let workspace = TempWorkspace::new();
        workspace.create_dir("build");
        workspace.create_dir("docs");
        Self {
            workspace,
            trailing_slash: false,
        }
    }

    pub fn out_dir(&self) -> PathBuf {
        self.workspace.path().join("build")
    }

    /// Writes the output file for a route relative to the base URL.
    pub fn add_page(&self, route: &str, html: &str) {
        let file = if self.trailing_slash {
            format!("build/{route}/index.html")
        } else {
            format!("build/{route}.html")
        };
        self.workspace.create_file(&file, html);
    }

    pub fn context(&self) -> BuildContext {
        BuildContext {
            base_url: "/".to_string(),
            out_dir: self.out_dir(),
            site_dir: self.workspace.path().to_path_buf(),
            trailing_slash: self.trailing_slash,
            client_targets: vec![self.workspace.path().join("client")],
        }
    }

    pub async fn build(&self, options: &SearchOptions, routes: &[&str]) -> sitedex::Result<BuildOutput> {
        let routes: Vec<String> = routes.iter().map(|r| r.to_string()).collect();
        sitedex::build(&self.context(), options, Arc::new(HtmlExtractor), &routes).await
    }
}

impl Default for TestSite {
    fn default() -> Self {
        Self::new()
    }
}

#[fixture]
pub fn site() -> TestSite {
    sitedex::logging::init(tracing::Level::DEBUG, sitedex::logging::LogFormat::Compact);
    TestSite::new()
}
