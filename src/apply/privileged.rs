//! Privilege-escalation capability for mutating filesystem primitives.
//!
//! The applier performs every mutation through a [`PrivilegedExecutor`].
//! [`DirectExecutor`] issues plain syscalls; when one fails with a
//! permission error the applier retries exactly once through the fallback
//! executor, in production [`SudoExecutor`], which re-runs the same
//! primitive via `sudo` with the controlling terminal attached so it can
//! prompt for credentials. Tests inject fakes for both sides.

use std::io;
use std::path::Path;

use crate::exec;

/// The three mutating primitives the applier needs.
///
/// Implementations must be equivalent in effect: removing a file/symlink or
/// an empty directory, creating a directory with all missing ancestors, and
/// creating a symlink.
pub trait PrivilegedExecutor: std::fmt::Debug {
    /// Remove the file, symlink, or empty directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error on failure.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Create `path` and any missing ancestor directories.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error on failure.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create a symlink at `target` pointing to `source`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error on failure.
    fn symlink(&self, source: &Path, target: &Path) -> io::Result<()>;
}

/// Plain-syscall implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectExecutor;

impl PrivilegedExecutor for DirectExecutor {
    fn remove(&self, path: &Path) -> io::Result<()> {
        let meta = std::fs::symlink_metadata(path)?;
        if meta.is_dir() {
            std::fs::remove_dir(path)
        } else {
            std::fs::remove_file(path)
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn symlink(&self, source: &Path, target: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(source, target)
        }
        #[cfg(windows)]
        {
            if source.is_dir() {
                std::os::windows::fs::symlink_dir(source, target)
            } else {
                std::os::windows::fs::symlink_file(source, target)
            }
        }
    }
}

/// Shell-out implementation that re-runs each primitive through `sudo`.
///
/// Inherits stdin/stdout/stderr so `sudo` can prompt interactively; the
/// helper's exit status is the sole success signal. This is the only
/// blocking point in the engine and is not cancellable once started.
#[derive(Debug, Default, Clone, Copy)]
pub struct SudoExecutor;

impl SudoExecutor {
    fn run(args: &[&str]) -> io::Result<()> {
        exec::run_interactive("sudo", args).map_err(io::Error::other)
    }
}

impl PrivilegedExecutor for SudoExecutor {
    fn remove(&self, path: &Path) -> io::Result<()> {
        let path = path.to_string_lossy();
        Self::run(&["rm", "-f", "--", &path])
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = path.to_string_lossy();
        Self::run(&["mkdir", "-p", "--", &path])
    }

    fn symlink(&self, source: &Path, target: &Path) -> io::Result<()> {
        let source = source.to_string_lossy();
        let target = target.to_string_lossy();
        Self::run(&["ln", "-sf", "--", &source, &target])
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn direct_remove_handles_files_and_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, "x").unwrap();
        DirectExecutor.remove(&file).unwrap();
        assert!(!file.exists());

        #[cfg(unix)]
        {
            let dangling = dir.path().join("dangling");
            std::os::unix::fs::symlink(dir.path().join("gone"), &dangling).unwrap();
            DirectExecutor.remove(&dangling).unwrap();
            assert!(dangling.symlink_metadata().is_err());
        }
    }

    #[test]
    fn direct_remove_missing_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DirectExecutor.remove(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn direct_create_dir_all_creates_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        DirectExecutor.create_dir_all(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn direct_symlink_points_at_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        let target = dir.path().join("dst");
        std::fs::write(&source, "x").unwrap();

        DirectExecutor.symlink(&source, &target).unwrap();
        assert_eq!(std::fs::read_link(&target).unwrap(), source);
    }
}
