//! Log subscriber setup for the CLI and tests.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::TestWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

static INIT: Once = Once::new();

/// Shape of emitted log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// One human-readable line per event.
    #[default]
    Compact,
    /// Newline-delimited JSON objects, for CI log collectors.
    Json,
}

fn under_test() -> bool {
    std::env::var("NEXTEST").is_ok() || std::env::var("CARGO_TARGET_TMPDIR").is_ok()
}

/// Installs the global subscriber once; later calls are ignored.
///
/// `RUST_LOG` overrides `level`. Output goes to stderr so `sitedex query`
/// results on stdout stay clean; under test it goes to the captured test writer.
pub fn init(level: Level, format: LogFormat) {
    INIT.call_once(|| {
        let testing = under_test();
        let filter = EnvFilter::builder()
            .with_default_directive(if testing { Level::DEBUG } else { level }.into())
            .from_env_lossy();
        let writer = if testing {
            BoxMakeWriter::new(TestWriter::new())
        } else {
            BoxMakeWriter::new(std::io::stderr)
        };

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true);

        let result = match format {
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Json => builder.json().flatten_event(true).try_init(),
        };
        if let Err(e) = result {
            eprintln!("Failed to initialize logging: {}", e);
        }
    });
}
