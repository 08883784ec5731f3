//! `tracing` setup for the `gridops` binary.
//!
//! Diagnostics go to `$XDG_STATE_HOME/gridops/gridops.log`; when that file
//! cannot be opened the caller switches to stderr. User-facing results
//! (response bodies, link actions) are printed by the command handlers, not
//! logged.

use anyhow::{anyhow, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,gridops=debug,gridops_core=debug";

/// Hands each event a clone of the log file handle.
struct LogFile(File);

/// Per-event sink. Stderr is used for an event whose file handle could not
/// be cloned.
enum LogSink {
    File(File),
    Stderr(io::Stderr),
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr(e) => e.lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr(e) => e.lock().flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> LogSink {
        match self.0.try_clone() {
            Ok(f) => LogSink::File(f),
            Err(_) => LogSink::Stderr(io::stderr()),
        }
    }
}

/// `RUST_LOG` if set and valid, otherwise [`DEFAULT_FILTER`].
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn install<W>(writer: W) -> Result<()>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("tracing subscriber: {e}"))
}

/// Location of the log file, creating its directory if needed.
pub fn log_file_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("gridops")?;
    Ok(dirs.place_state_file("gridops.log")?)
}

/// Log to the XDG state file. Errors leave no subscriber installed, so the
/// caller can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    install(LogFile(file))?;
    tracing::info!(path = %path.display(), "gridops logging initialized");
    Ok(())
}

/// Log to stderr. A subscriber installed earlier is left in place.
pub fn init_logging_stderr() {
    let _ = install(io::stderr);
}
