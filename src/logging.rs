//! Structured logging with dry-run awareness.
//!
//! All engine entry points receive a [`Logger`] by reference rather than
//! consulting process-wide flags; the verbose/dry-run decisions are made by
//! the value that was threaded in. Messages are emitted through [`tracing`]
//! so an embedding application can install its own subscriber; the CLI
//! installs a stderr subscriber via [`init_subscriber`].

use std::io::IsTerminal as _;

use tracing_subscriber::EnvFilter;

/// Install the global stderr subscriber for CLI runs.
///
/// `RUST_LOG` takes precedence when set; otherwise the level is `debug` with
/// `verbose` and `info` without. Installation is best-effort so tests that
/// initialise logging more than once do not fail.
pub fn init_subscriber(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Structured logger threaded into engine entry points.
///
/// Wraps the [`tracing`] macros with the small set of message kinds the
/// engine emits. `debug` messages are per-item detail that only surfaces
/// with the verbose flag (or `RUST_LOG`); `dry_run` marks actions that were
/// *not* performed.
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    verbose: bool,
}

impl Logger {
    /// Create a new logger.
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Whether per-item detail messages are enabled.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "dotlink::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log per-item detail. Promoted to `info` when verbose so it is visible
    /// without configuring `RUST_LOG`.
    pub fn debug(&self, msg: &str) {
        if self.verbose {
            tracing::info!("{msg}");
        } else {
            tracing::debug!("{msg}");
        }
    }

    /// Log an action that a dry run skipped.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!("[dry-run] {msg}");
    }
}
