//! Process execution helpers.
//!
//! The captured variant ([`run_unchecked`]) collects stdout/stderr;
//! [`run_interactive`] inherits the controlling terminal so a helper such as
//! `sudo` can prompt for credentials.

use std::process::{Command, Output};

use anyhow::{Context, Result, bail};

/// Result of a captured command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
    /// Whether the command exited successfully.
    pub success: bool,
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Run a command, allowing failure (returns result without bailing).
pub fn run_unchecked(program: &str, args: &[&str]) -> Result<ExecResult> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to execute: {program}"))?;

    Ok(ExecResult::from(output))
}

/// Run a command with stdin/stdout/stderr inherited from this process.
///
/// Required for helpers that prompt on the controlling terminal (`sudo`).
/// Blocks until the command exits; the exit status is the sole success
/// signal.
pub fn run_interactive(program: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("failed to execute: {program}"))?;
    if !status.success() {
        bail!("{program} failed (exit {})", status.code().unwrap_or(-1));
    }
    Ok(())
}
