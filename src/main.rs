use anyhow::{Context, Result};
use clap::Parser;
use sitedex::artifact::SearchIndexFile;
use sitedex::cli::{Cli, Commands};
use sitedex::config::SearchOptions;
use sitedex::discover::{discover_routes, read_routes_file};
use sitedex::extract::HtmlExtractor;
use sitedex::pipeline::{BuildContext, build};
use sitedex::search::QueryOptions;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    sitedex::logging::init(level, cli.log_format);

    match cli.command {
        Commands::Build {
            out_dir,
            site_dir,
            base_url,
            config,
            routes,
            trailing_slash,
            client_targets,
        } => {
            let options = match &config {
                Some(path) => SearchOptions::load(path)
                    .with_context(|| format!("Failed to load options from {}", path.display()))?,
                None => SearchOptions::default(),
            };
            let routes = match &routes {
                Some(path) => read_routes_file(path)
                    .await
                    .with_context(|| format!("Failed to read routes from {}", path.display()))?,
                None => discover_routes(&out_dir, &base_url, trailing_slash)
                    .await
                    .context("Failed to discover routes")?,
            };
            let client_targets = if client_targets.is_empty() {
                vec![out_dir.clone()]
            } else {
                client_targets
            };

            let ctx = BuildContext {
                base_url,
                out_dir,
                site_dir,
                trailing_slash,
                client_targets,
            };
            let output = build(&ctx, &options, Arc::new(HtmlExtractor), &routes)
                .await
                .context("Search index build failed")?;

            println!(
                "Indexed {} documents into {}",
                output.document_count(),
                output.written.index.display()
            );
            for path in &output.written.client_configs {
                println!("Client config: {}", path.display());
            }
        }
        Commands::Query {
            query,
            index,
            doc_version,
            limit,
        } => run_query(&index, &query, doc_version, limit).await?,
    }

    Ok(())
}

async fn run_query(path: &Path, query: &str, version: Option<String>, limit: usize) -> Result<()> {
    let file = SearchIndexFile::load(path)
        .await
        .with_context(|| format!("Failed to load index {}", path.display()))?;
    let searcher = file.index.searcher().context("Index tokenizer is invalid")?;

    let options = QueryOptions {
        version,
        limit: Some(limit),
    };
    let hits = searcher.search_with(query, &options);
    if hits.is_empty() {
        println!("No results for '{}'", query);
        return Ok(());
    }

    for hit in hits {
        let Some(doc) = file.document(&hit.reference) else {
            tracing::warn!("Index references unknown document {}", hit.reference);
            continue;
        };
        println!("{:>8.3}  {} > {}", hit.score, doc.page_title, doc.section_title);
        println!("          {}", doc.section_route);
    }
    Ok(())
}
