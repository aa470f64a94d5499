//! Logging initialization.
//!
//! Structured logging via `tracing`. Verbosity comes from the `-v` count and
//! can be overridden with the `WORKOUT_TIMER_LOG` environment variable.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "WORKOUT_TIMER_LOG";

/// Maps a verbosity level to a tracing directive string.
///
/// - 0 → `"warn"`
/// - 1 → `"info"`
/// - 2 → `"debug"`
/// - 3+ → `"trace"` (saturates)
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Where log lines should go for the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    /// The terminal belongs to the TUI; log lines are discarded.
    Quiet,
}

impl LogTarget<'_> {
    pub fn writes_to_stderr(self) -> bool {
        matches!(self, LogTarget::Stderr)
    }
}

/// Installs the global subscriber. Calling it more than once is harmless.
pub fn init_logging(verbosity: u8, target: LogTarget<'_>) -> anyhow::Result<()> {
    let default_directive = match target {
        LogTarget::Quiet => "error",
        _ => verbosity_to_directive(verbosity),
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));
    let show_target = verbosity >= 2;

    match target {
        LogTarget::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("open log file {}: {e}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_target(show_target)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        LogTarget::Stderr | LogTarget::Quiet => {
            let writer = if target.writes_to_stderr() {
                BoxMakeWriter::new(std::io::stderr)
            } else {
                BoxMakeWriter::new(std::io::sink)
            };
            let use_ansi = target.writes_to_stderr()
                && std::io::stderr().is_terminal()
                && std::env::var_os("NO_COLOR").is_none();
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(use_ansi)
                .with_target(show_target)
                .with_writer(writer)
                .try_init();
        }
    }
    Ok(())
}
