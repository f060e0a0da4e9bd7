use std::{
    fs::{self, OpenOptions},
    path::Path,
    sync::Mutex,
};

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::errors::Result;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "RECTDB_LOG";
const DEFAULT_DIRECTIVES: &str = "info,sqlparser=warn";

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Route `tracing` events to `file_path`, appending. The terminal belongs to
/// the UI, so nothing is written to stdout or stderr.
///
/// # Errors
///
/// Fails when the log directory or file cannot be created.
pub fn init_logging(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new().create(true).append(true).open(file_path)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .with_target(true)
        .with_filter(build_env_filter());

    // A second init (tests) leaves the first subscriber in place.
    tracing_subscriber::registry().with(file_layer).try_init().ok();

    tracing::debug!(file = %file_path.display(), "logging initialized");
    Ok(())
}
