//! Logging setup.
//!
//! The TUI owns the terminal, so log lines go to a file in the state
//! directory instead of stderr.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Default filter for a `-v` count. `RUST_LOG` takes precedence.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a global subscriber appending to `log_path`.
pub fn init_logging(log_path: &Path, verbose: u8) -> io::Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)));

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(verbose >= 2)
        .try_init();

    tracing::debug!(verbose, "logging initialised");
    Ok(())
}
