//! Host environment lookups: home directory and hostname.

use std::path::PathBuf;

use crate::exec;

/// Resolve the current user's home directory.
///
/// Uses the platform convention via [`dirs::home_dir`], falling back to the
/// `HOME` environment variable. Returns `None` when neither is available.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().or_else(|| std::env::var_os("HOME").map(PathBuf::from))
}

/// Best-effort machine hostname.
///
/// Tries the `HOSTNAME` environment variable, then the `hostname` utility.
/// Falls back to the literal `"unknown"`; never fails. The value is
/// informational only (stamped into generated plans), not a targeting
/// filter.
#[must_use]
pub fn hostname() -> String {
    if let Ok(name) = std::env::var("HOSTNAME")
        && !name.trim().is_empty()
    {
        return name.trim().to_string();
    }

    if let Ok(result) = exec::run_unchecked("hostname", &[])
        && result.success
        && !result.stdout.trim().is_empty()
    {
        return result.stdout.trim().to_string();
    }

    "unknown".to_string()
}
