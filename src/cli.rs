use crate::logging::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sitedex")]
#[command(about = "Build and query BM25 search indexes for static sites", long_about = None)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index the generated pages of a site
    Build {
        /// Directory holding the generated pages
        #[arg(short, long, default_value = "build")]
        out_dir: PathBuf,
        /// Site source root (docs directory and versions.json are resolved against it)
        #[arg(short, long, default_value = ".")]
        site_dir: PathBuf,
        #[arg(short, long, default_value = "/")]
        base_url: String,
        /// Options file; defaults apply when absent
        #[arg(short, long, env = "SITEDEX_CONFIG")]
        config: Option<PathBuf>,
        /// File listing one route per line; the output directory is walked when omitted
        #[arg(short, long)]
        routes: Option<PathBuf>,
        /// Pages are written as `route/index.html`
        #[arg(long)]
        trailing_slash: bool,
        /// Directory receiving the client configuration (repeatable; defaults to the output directory)
        #[arg(short = 't', long = "client-target")]
        client_targets: Vec<PathBuf>,
    },
    /// Search a built index
    Query {
        query: String,
        #[arg(short, long, default_value = "build/search-index.json")]
        index: PathBuf,
        /// Only return documents of this docs version
        #[arg(long)]
        doc_version: Option<String>,
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}
