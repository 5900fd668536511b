//! On-disk artifacts: the searchable index and the client runtime configuration.

use crate::config::IndexConfig;
use crate::document::DocumentMetadata;
use crate::error::{Error, Result};
use crate::search::{INDEX_FORMAT_VERSION, SearchIndex, TokenizerSpec};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Index artifact, written at the output directory root.
pub const INDEX_FILE: &str = "search-index.json";

/// Client configuration, written to every client target directory.
pub const CLIENT_CONFIG_FILE: &str = "search-config.json";

/// Layout version of [`ClientConfig`].
pub const CLIENT_CONFIG_VERSION: u32 = 1;

/// Name recorded as the query engine in client configurations.
pub const ENGINE_NAME: &str = "sitedex-bm25";

/// Serialized index together with the metadata needed to render hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchIndexFile {
    /// Ordered by id; `documents[i].id` is the reference `i + 1`.
    pub documents: Vec<DocumentMetadata>,
    pub index: SearchIndex,
}

impl SearchIndexFile {
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::io(path, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Metadata for an index reference.
    pub fn document(&self, reference: &str) -> Option<&DocumentMetadata> {
        let id: u32 = reference.parse().ok()?;
        let position = usize::try_from(id.checked_sub(1)?).ok()?;
        self.documents.get(position).filter(|doc| doc.id == id)
    }
}

/// Query engine a client should load the index with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineHandle {
    pub name: String,
    pub index_format_version: u32,
}

/// Everything a client needs to query the index the way it was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub format_version: u32,
    pub engine: EngineHandle,
    pub tokenizer: TokenizerSpec,
    pub title_boost: f64,
    pub content_boost: f64,
    pub parent_categories_boost: f64,
    /// Without the leading `/`.
    pub docs_base_path: String,
    pub blog_base_path: String,
    pub index_doc_sidebar_parent_categories: usize,
    pub index_file: String,
}

impl ClientConfig {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            format_version: CLIENT_CONFIG_VERSION,
            engine: EngineHandle {
                name: ENGINE_NAME.to_string(),
                index_format_version: INDEX_FORMAT_VERSION,
            },
            tokenizer: config.tokenizer.clone(),
            title_boost: config.title_boost,
            content_boost: config.content_boost,
            parent_categories_boost: config.parent_categories_boost,
            docs_base_path: config.docs_base_path.clone(),
            blog_base_path: config.blog_base_path.clone(),
            index_doc_sidebar_parent_categories: config.category_depth,
            index_file: INDEX_FILE.to_string(),
        }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::io(path, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Paths written by [`write_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub index: PathBuf,
    pub client_configs: Vec<PathBuf>,
}

async fn write_file(path: PathBuf, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e))?;
    }
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| Error::io(&path, e))?;
    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Writes the index to `out_dir` and the client config to every target, concurrently.
///
/// Returns once every write has completed; the first failure fails the whole call.
pub async fn write_artifacts(
    out_dir: &Path,
    client_targets: &[PathBuf],
    file: &SearchIndexFile,
    client_config: &ClientConfig,
) -> Result<WrittenArtifacts> {
    let index_bytes = serde_json::to_vec(file)?;
    let config_bytes = serde_json::to_vec_pretty(client_config)?;

    let index_write = write_file(out_dir.join(INDEX_FILE), &index_bytes);
    let config_writes = try_join_all(
        client_targets
            .iter()
            .map(|target| write_file(target.join(CLIENT_CONFIG_FILE), &config_bytes)),
    );

    let (index, client_configs) = futures::try_join!(index_write, config_writes)?;
    Ok(WrittenArtifacts {
        index,
        client_configs,
    })
}
