//! Build orchestration: routes in, artifacts out.
//!
//! Page reads are issued concurrently by a producer task and delivered in
//! route order over a bounded channel to a single blocking consumer, which owns
//! the id counter and the [`IndexBuilder`].

use crate::artifact::{ClientConfig, SearchIndexFile, WrittenArtifacts, write_artifacts};
use crate::config::{IndexConfig, SearchOptions};
use crate::document::{ExtractedPage, IdCounter, assemble};
use crate::error::{Error, IntegrityError, Result};
use crate::extract::PageExtractor;
use crate::route::RouteEntry;
use crate::search::IndexBuilder;
use crate::versions;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Maximum number of page reads in flight.
pub const READ_CONCURRENCY: usize = 16;

/// Extracted pages buffered between the readers and the index builder.
pub const CHANNEL_CAPACITY: usize = 64;

/// Site-level inputs of one build.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Base URL every route starts with, ending in `/`.
    pub base_url: String,
    /// Directory holding the generated pages.
    pub out_dir: PathBuf,
    /// Site source root; the docs directory is resolved against it.
    pub site_dir: PathBuf,
    /// Pages live at `route/index.html` instead of `route.html`.
    pub trailing_slash: bool,
    /// Directories receiving the client configuration.
    pub client_targets: Vec<PathBuf>,
}

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildOutput {
    pub client_config: ClientConfig,
    pub index: SearchIndexFile,
    pub written: WrittenArtifacts,
}

impl BuildOutput {
    pub fn document_count(&self) -> usize {
        self.index.documents.len()
    }
}

type PageResult = Result<(RouteEntry, ExtractedPage)>;

async fn read_page(
    entry: RouteEntry,
    out_dir: &Path,
    trailing_slash: bool,
    extractor: &dyn PageExtractor,
) -> PageResult {
    let path = entry.file_path(out_dir, trailing_slash);
    let html = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| IntegrityError::MissingPage {
            route: entry.url.clone(),
            path: path.clone(),
            reason: e.to_string(),
        })?;
    let page = extractor.extract(&html, entry.category, &entry.url)?;
    Ok((entry, page))
}

/// Reads and extracts pages concurrently, sending them in route order.
///
/// Stops at the first failure (after forwarding it) or when the receiver is gone.
async fn produce_pages(
    entries: Vec<RouteEntry>,
    out_dir: PathBuf,
    trailing_slash: bool,
    extractor: Arc<dyn PageExtractor>,
    tx: mpsc::Sender<PageResult>,
) {
    let mut pages = futures::stream::iter(entries)
        .map(move |entry| {
            let out_dir = out_dir.clone();
            let extractor = Arc::clone(&extractor);
            async move { read_page(entry, &out_dir, trailing_slash, extractor.as_ref()).await }
        })
        .buffered(READ_CONCURRENCY);

    while let Some(page) = pages.next().await {
        let failed = page.is_err();
        if tx.send(page).await.is_err() || failed {
            break;
        }
    }
}

/// Assigns ids and feeds documents to the index builder until the channel closes.
fn consume_pages(config: &IndexConfig, mut rx: mpsc::Receiver<PageResult>) -> Result<SearchIndexFile> {
    let mut builder = IndexBuilder::new(config.tokenizer.clone(), config.schema())?;
    let mut ids = IdCounter::default();
    let mut documents = vec![];
    let assembly = config.assembly();

    while let Some(page) = rx.blocking_recv() {
        let (entry, page) = page?;
        for doc in assemble(page, entry.category, &entry.url, assembly, &mut ids) {
            builder.add(&doc)?;
            documents.push(doc.metadata(assembly.version_aware));
        }
    }

    debug!("Assigned {} document ids", ids.issued());
    Ok(SearchIndexFile {
        documents,
        index: builder.finish(),
    })
}

/// Validates options, loads versions, then indexes every route and writes the artifacts.
pub async fn build(
    ctx: &BuildContext,
    options: &SearchOptions,
    extractor: Arc<dyn PageExtractor>,
    routes: &[String],
) -> Result<BuildOutput> {
    let start = Instant::now();

    let config = options.validate()?;
    let versions = versions::load(&ctx.site_dir.join(&config.docs_dir)).await?;
    let config = config.with_versions(versions);

    let entries = config.route_rules(&ctx.base_url).classify_all(routes)?;
    info!(
        "Indexing {} of {} routes (languages: {:?})",
        entries.len(),
        routes.len(),
        config.tokenizer.languages
    );

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let producer = tokio::spawn(produce_pages(
        entries,
        ctx.out_dir.clone(),
        ctx.trailing_slash,
        extractor,
        tx,
    ));

    let consumer_config = config.clone();
    let index = tokio::task::spawn_blocking(move || consume_pages(&consumer_config, rx))
        .await
        .map_err(|e| Error::Task(e.to_string()))??;
    producer.await.map_err(|e| Error::Task(e.to_string()))?;

    let client_config = ClientConfig::new(&config);
    let written = write_artifacts(&ctx.out_dir, &ctx.client_targets, &index, &client_config).await?;

    info!(
        "Search index built: {} documents, {} terms in {:?}",
        index.documents.len(),
        index.index.term_count(),
        start.elapsed()
    );

    Ok(BuildOutput {
        client_config,
        index,
        written,
    })
}
