use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

const DEFAULT_FILTER: &str = "info";

/// Routes `tracing` output to `output_path`. The terminal belongs to the
/// dashboard, so nothing is written to stdout or stderr.
pub fn init_file_logging(output_path: &Path, json: bool) -> Result<()> {
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(output_path)?;

    let builder = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(env_filter())
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(Mutex::new(file));

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
