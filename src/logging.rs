//! Tracing subscriber setup for the binary.

use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a log file, used when `--log` is absent.
pub const LOG_ENV: &str = "CELLVIEW_LOG";

/// Install a file-backed `fmt` subscriber filtered by `RUST_LOG` (default
/// `info`).
///
/// Without a path nothing is installed: writing to the terminal would
/// corrupt the TUI.
pub fn init_tracing(log_path: Option<&Path>) {
    let Some(path) = log_path else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match std::fs::File::create(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Warning: failed to create log file {}: {err}", path.display());
            return;
        }
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();
}
