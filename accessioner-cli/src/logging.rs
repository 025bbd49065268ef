//! Console and file logging
//!
//! Call sites use the `log` macros; `tracing-subscriber` picks those records
//! up through its `log` bridge. The console layer honors `RUST_LOG`. With a
//! log directory, this crate's records at debug level and above also go to
//! `<logs>/debug.log`, and errors to `<logs>/errors.log`, which is what the
//! failure notification attaches.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{Level, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{EnvFilter, Targets};
use tracing_subscriber::prelude::*;
use tracing_subscriber::Layer;
use tracing_subscriber::registry::LookupSpan;

pub const DEBUG_LOG: &str = "debug.log";
pub const ERROR_LOG: &str = "errors.log";

/// Records from dependencies (reqwest, hyper) stay out of the files
fn own_records(level: Level) -> Targets {
    Targets::new().with_target(env!("CARGO_CRATE_NAME"), level)
}

fn appender(dir: &Path, name: &str) -> anyhow::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .with_context(|| format!("Failed to open {}", dir.join(name).display()))
}

/// One plain-text layer per log file, each with its own level floor
fn file_layers<S>(dir: &Path) -> anyhow::Result<impl Layer<S> + use<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    // unwritable files are reported on stderr instead of dropping the line
    let debug = tracing_subscriber::fmt::layer()
        .with_writer(appender(dir, DEBUG_LOG)?)
        .with_ansi(false)
        .log_internal_errors(true)
        .with_filter(own_records(Level::DEBUG));
    let errors = tracing_subscriber::fmt::layer()
        .with_writer(appender(dir, ERROR_LOG)?)
        .with_ansi(false)
        .log_internal_errors(true)
        .with_filter(own_records(Level::ERROR));

    Ok(debug.and_then(errors))
}

/// Install the run logger; `verbose` raises the console default from info to debug
///
/// Returns the error log path when file logging is active.
pub fn init(log_dir: Option<&Path>, verbose: bool) -> anyhow::Result<Option<PathBuf>> {
    let default_level = if verbose { "debug" } else { "info" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);
    let files = log_dir
        .map(file_layers::<tracing_subscriber::Registry>)
        .transpose()?;

    tracing_subscriber::registry()
        .with(files)
        .with(console)
        .try_init()
        .context("Failed to install logger")?;

    Ok(log_dir.map(|dir| dir.join(ERROR_LOG)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_layers_split_by_level() {
        let dir = tempfile::tempdir().unwrap();
        let layers = file_layers::<tracing_subscriber::Registry>(dir.path()).unwrap();
        let subscriber = tracing_subscriber::registry().with(layers);

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("looking up Box 1");
            tracing::error!("Top container not found");
            tracing::trace!("too chatty");
            tracing::error!(target: "hyper::client", "connection reset");
        });

        let debug = std::fs::read_to_string(dir.path().join(DEBUG_LOG)).unwrap();
        let errors = std::fs::read_to_string(dir.path().join(ERROR_LOG)).unwrap();
        assert!(debug.contains("looking up Box 1"));
        assert!(debug.contains("Top container not found"));
        assert!(!debug.contains("too chatty"));
        assert!(!debug.contains("connection reset"));
        assert!(!errors.contains("looking up Box 1"));
        assert!(errors.contains("ERROR"));
        assert!(errors.contains("Top container not found"));
    }
}
