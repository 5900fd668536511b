//! Versioned-docs manifest detection.

use crate::error::{ConfigError, Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Manifest file name, looked up next to the docs source directory.
pub const VERSIONS_FILE: &str = "versions.json";

/// Version of the unreleased docs, always present when versioning is on.
pub const NEXT_VERSION: &str = "next";

/// Location of the manifest for a docs source directory.
pub fn manifest_path(docs_dir: &Path) -> PathBuf {
    docs_dir
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(VERSIONS_FILE)
}

/// Parses manifest content: a JSON array of version names, newest first.
pub fn parse_manifest(content: &str, path: &Path) -> Result<Vec<String>> {
    let versions: Vec<String> =
        serde_json::from_str(content).map_err(|e| ConfigError::InvalidVersionsManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(std::iter::once(NEXT_VERSION.to_string())
        .chain(versions.into_iter().filter(|v| v != NEXT_VERSION))
        .collect())
}

/// Loads the version list for `docs_dir`.
///
/// Returns `None` when the site is not versioned. A missing docs directory is
/// not an error: versioning is simply left off.
pub async fn load(docs_dir: &Path) -> Result<Option<Vec<String>>> {
    if !tokio::fs::try_exists(docs_dir)
        .await
        .map_err(|e| Error::io(docs_dir, e))?
    {
        warn!(
            "Docs directory {} does not exist, skipping version detection",
            docs_dir.display()
        );
        return Ok(None);
    }

    let path = manifest_path(docs_dir);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No {} found, indexing without versions", path.display());
            return Ok(None);
        }
        Err(e) => return Err(Error::io(&path, e)),
    };

    let versions = parse_manifest(&content, &path)?;
    debug!("Versioned docs detected: {:?}", versions);
    Ok(Some(versions))
}
