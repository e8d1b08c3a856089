//! Plan application: the per-link symlink state machine.
//!
//! Each link is driven through a fixed sequence of checks (missing source,
//! already correct, backup, stale target, missing parent, create) with the
//! first matching condition deciding the action. Every mutating step honors
//! dry-run and retries exactly once through the privileged fallback on a
//! permission error. One link's failure never aborts the batch.

pub mod privileged;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::logging::Logger;
use crate::plan::{Link, Plan};
use privileged::{DirectExecutor, PrivilegedExecutor, SudoExecutor};

/// Immutable execution options threaded into the applier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Log mutations instead of performing them.
    pub dry_run: bool,
    /// Copy an existing regular file aside before replacing it.
    pub backup: bool,
    /// Emit per-link detail.
    pub verbose: bool,
}

/// Outcome of applying a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The symlink was created (or would have been, under dry-run).
    Applied,
    /// The target already pointed at the source; nothing to do.
    AlreadyCorrect,
    /// The link was skipped (e.g. missing source file).
    Skipped {
        /// Why the link was skipped.
        reason: String,
    },
}

/// Per-batch counters accumulated by [`Applier::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Links processed.
    pub total: usize,
    /// Links applied or already correct.
    pub success: usize,
    /// Links skipped or failed.
    pub skipped: usize,
}

/// Executes plans against the filesystem.
///
/// Concurrent invocations against the same target paths are unsynchronized
/// and may race; each invocation is an independent batch.
#[derive(Debug)]
pub struct Applier<'a> {
    log: &'a Logger,
    direct: Box<dyn PrivilegedExecutor>,
    fallback: Box<dyn PrivilegedExecutor>,
}

impl<'a> Applier<'a> {
    /// Create an applier with the production executors (plain syscalls,
    /// `sudo` fallback).
    #[must_use]
    pub fn new(log: &'a Logger) -> Self {
        Self::with_executors(log, Box::new(DirectExecutor), Box::new(SudoExecutor))
    }

    /// Create an applier with injected executors.
    #[must_use]
    pub fn with_executors(
        log: &'a Logger,
        direct: Box<dyn PrivilegedExecutor>,
        fallback: Box<dyn PrivilegedExecutor>,
    ) -> Self {
        Self {
            log,
            direct,
            fallback,
        }
    }

    /// Apply every link in `plan`, accumulating per-batch counters.
    ///
    /// Per-link failures are reported and counted as skips; the batch always
    /// runs to completion. Callers must inspect the summary to detect a
    /// fully-failed batch.
    pub fn apply(&self, plan: &Plan, options: ApplyOptions) -> ApplySummary {
        self.log.stage("Applying execution plan");
        if options.dry_run {
            self.log.warn("dry-run mode: no changes will be made");
        }

        let mut summary = ApplySummary::default();
        for (index, link) in plan.links.iter().enumerate() {
            summary.total += 1;
            if options.verbose {
                self.log.debug(&format!(
                    "[{}] {} <- {} ({})",
                    index + 1,
                    link.target.display(),
                    link.source.display(),
                    link.reason
                ));
            }
            match self.apply_link(link, options) {
                Ok(LinkOutcome::Skipped { reason }) => {
                    self.log.warn(&format!("skipping {}: {reason}", link.target.display()));
                    summary.skipped += 1;
                }
                Ok(_) => summary.success += 1,
                Err(e) => {
                    self.log
                        .error(&format!("failed to link {}: {e:#}", link.target.display()));
                    summary.skipped += 1;
                }
            }
        }

        self.log.info(&format!(
            "apply complete: {} total, {} success, {} skipped",
            summary.total, summary.success, summary.skipped
        ));
        summary
    }

    /// Drive a single link through the state machine.
    ///
    /// # Errors
    ///
    /// Returns an error when a mutating step fails and the privileged
    /// fallback fails too (or the failure is not permission-related).
    pub fn apply_link(&self, link: &Link, options: ApplyOptions) -> Result<LinkOutcome> {
        if !link.source.exists() {
            return Ok(LinkOutcome::Skipped {
                reason: format!("source file not found: {}", link.source.display()),
            });
        }

        if is_correct_symlink(&link.target, &link.source) {
            self.log
                .debug(&format!("already linked: {}", link.target.display()));
            return Ok(LinkOutcome::AlreadyCorrect);
        }

        if options.backup && is_regular_file(&link.target) {
            let backup = backup_path(&link.target);
            if options.dry_run {
                self.log.dry_run(&format!(
                    "would back up {} -> {}",
                    link.target.display(),
                    backup.display()
                ));
            } else {
                // fs::copy carries permission bits along with the content.
                std::fs::copy(&link.target, &backup)
                    .with_context(|| format!("back up {}", link.target.display()))?;
                self.log.debug(&format!(
                    "backed up {} -> {}",
                    link.target.display(),
                    backup.display()
                ));
            }
        }

        // Lstat so broken symlinks count as present.
        if link.target.symlink_metadata().is_ok() {
            if options.dry_run {
                self.log
                    .dry_run(&format!("would remove {}", link.target.display()));
            } else {
                self.mutate(&format!("remove {}", link.target.display()), |ex| {
                    ex.remove(&link.target)
                })?;
                self.log.debug(&format!("removed {}", link.target.display()));
            }
        }

        if let Some(parent) = link.target.parent()
            && !parent.exists()
        {
            if options.dry_run {
                self.log
                    .dry_run(&format!("would create directory {}", parent.display()));
            } else {
                self.mutate(&format!("create directory {}", parent.display()), |ex| {
                    ex.create_dir_all(parent)
                })?;
                self.log
                    .debug(&format!("created directory {}", parent.display()));
            }
        }

        if options.dry_run {
            self.log.dry_run(&format!(
                "would link {} -> {}",
                link.target.display(),
                link.source.display()
            ));
        } else {
            self.mutate(
                &format!(
                    "create symlink {} -> {}",
                    link.target.display(),
                    link.source.display()
                ),
                |ex| ex.symlink(&link.source, &link.target),
            )?;
            self.log.debug(&format!(
                "linked {} -> {}",
                link.target.display(),
                link.source.display()
            ));
        }

        Ok(LinkOutcome::Applied)
    }

    /// Run a mutating primitive, retrying once through the privileged
    /// fallback when the direct attempt is denied.
    fn mutate(
        &self,
        what: &str,
        attempt: impl Fn(&dyn PrivilegedExecutor) -> io::Result<()>,
    ) -> Result<()> {
        match attempt(self.direct.as_ref()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                self.log.warn(&format!(
                    "permission denied: {what}; retrying with elevated privileges"
                ));
                attempt(self.fallback.as_ref())
                    .with_context(|| format!("{what} (even with elevated privileges)"))
            }
            Err(e) => Err(e).with_context(|| what.to_string()),
        }
    }
}

/// Whether `target` is a symlink whose recorded value equals `source`.
///
/// Comparison is byte-wise on the recorded path, without canonicalization.
fn is_correct_symlink(target: &Path, source: &Path) -> bool {
    std::fs::read_link(target).is_ok_and(|existing| existing == source)
}

/// Whether `target` is an existing regular file (not a symlink).
fn is_regular_file(target: &Path) -> bool {
    target
        .symlink_metadata()
        .is_ok_and(|meta| meta.file_type().is_file())
}

/// Timestamped sibling path used for backups.
fn backup_path(target: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("{}.backup.{stamp}", target.display()))
}
