//! Route list sources for the command line: a routes file, or a walk of the output directory.

use crate::error::{Error, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maps an output file (relative to the output directory) back to its full route.
///
/// Only files that resolve back to themselves under the chosen layout yield a route.
pub fn route_for_file(relative: &Path, base_url: &str, trailing_slash: bool) -> Option<String> {
    let relative = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?
        .join("/");
    let stem = relative.strip_suffix(".html")?;

    if stem == "index" {
        return Some(base_url.to_string());
    }
    if stem == "404" {
        return None;
    }
    match (stem.strip_suffix("/index"), trailing_slash) {
        (Some(dir), true) => Some(format!("{base_url}{dir}/")),
        (None, false) => Some(format!("{base_url}{stem}")),
        _ => None,
    }
}

/// Walks `out_dir` for generated pages, returning routes in sorted order.
pub async fn discover_routes(out_dir: &Path, base_url: &str, trailing_slash: bool) -> Result<Vec<String>> {
    let dir = out_dir.to_path_buf();
    let base_url = base_url.to_string();

    tokio::task::spawn_blocking(move || {
        let mut files: Vec<PathBuf> = WalkBuilder::new(&dir)
            .standard_filters(false)
            .build()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
            .filter_map(|e| e.path().strip_prefix(&dir).ok().map(Path::to_path_buf))
            .collect();
        files.sort();

        let routes: Vec<String> = files
            .iter()
            .filter_map(|file| {
                let route = route_for_file(file, &base_url, trailing_slash);
                if route.is_none() && file.extension().is_some_and(|ext| ext == "html") {
                    debug!("Skipping {} (not a page under this layout)", file.display());
                }
                route
            })
            .collect();
        debug!("Discovered {} routes in {}", routes.len(), dir.display());
        routes
    })
    .await
    .map_err(|e| Error::Task(e.to_string()))
}

/// Reads a routes file: one route per line, blank lines and `#` comments ignored.
pub async fn read_routes_file(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
