//! Tracing subscriber setup for the `aish` binary.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_VAR: &str = "AISH_LOG";
pub const LOG_FILE_VAR: &str = "AISH_LOG_FILE";
const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber. Filter from `AISH_LOG` (default `warn`);
/// output appended to `AISH_LOG_FILE` when set, else stderr.
pub fn init() -> io::Result<()> {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let writer = match std::env::var_os(LOG_FILE_VAR).filter(|path| !path.is_empty()) {
        Some(path) => file_writer(Path::new(&path))?,
        None => BoxMakeWriter::new(io::stderr),
    };

    // A subscriber installed earlier (tests, embedding) wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn file_writer(path: &Path) -> io::Result<BoxMakeWriter> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BoxMakeWriter::new(Mutex::new(file)))
}
