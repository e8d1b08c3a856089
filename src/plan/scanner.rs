//! Source-tree scanning: one link candidate per discovered file.
//!
//! A source layer holds up to two conventional subtrees: `home/` (linked
//! into the user's home directory) and `root/` (linked under `/`). Absence
//! of either subtree is normal; presence of a non-directory in its place is
//! an error.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::PlanError;
use crate::logging::Logger;
use crate::plan::LinkReason;

/// Which conventional subtree of a source layer to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    /// `<layer>/home`, linked into the current user's home directory.
    Home,
    /// `<layer>/root`, linked under the filesystem root.
    Root,
}

impl TreeKind {
    /// Subdirectory name within a source layer.
    #[must_use]
    pub const fn subdir(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Root => "root",
        }
    }

    /// Destination base the subtree's files map onto.
    #[must_use]
    pub fn destination_base(self, home: &Path) -> PathBuf {
        match self {
            Self::Home => home.to_path_buf(),
            Self::Root => PathBuf::from("/"),
        }
    }
}

/// A pre-merge link entry produced by scanning.
///
/// Consumed (and possibly rewritten) by the generator; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Absolute path of the discovered file (or collapsed folder).
    pub source: PathBuf,
    /// Absolute destination path the symlink would be created at.
    pub target: PathBuf,
    /// The source layer that produced this candidate.
    pub origin: PathBuf,
    /// Provenance, rewritten during merge and remap.
    pub reason: LinkReason,
}

/// Scan one subtree of `source_root`, yielding a candidate per file.
///
/// Directories are not linked individually; symlinks and special files
/// encountered during the walk are treated as ordinary leaf entries.
/// Traversal order is filesystem-dependent; callers must not rely on it.
///
/// # Errors
///
/// Returns [`PlanError::NotADirectory`] when `<source_root>/<kind>` exists
/// but is not a directory, and [`PlanError::Scan`] on walk failures. A
/// missing subtree yields an empty list, not an error.
pub fn scan(
    source_root: &Path,
    kind: TreeKind,
    home: &Path,
    log: &Logger,
) -> Result<Vec<LinkCandidate>, PlanError> {
    let scan_root = source_root.join(kind.subdir());

    match std::fs::metadata(&scan_root) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log.debug(&format!("no {} subtree in {}", kind.subdir(), source_root.display()));
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(PlanError::Scan {
                path: scan_root,
                source: e,
            });
        }
        Ok(meta) if !meta.is_dir() => return Err(PlanError::NotADirectory(scan_root)),
        Ok(_) => {}
    }

    log.debug(&format!("scanning {}", scan_root.display()));

    let base = kind.destination_base(home);
    let mut candidates = Vec::new();
    for entry in WalkDir::new(&scan_root).follow_links(false) {
        let entry = entry.map_err(|e| PlanError::Scan {
            path: scan_root.clone(),
            source: e.into(),
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        // walkdir only yields paths under its root; a failed strip means the
        // entry is not linkable and is ignored.
        let Ok(rel) = entry.path().strip_prefix(&scan_root) else {
            continue;
        };
        let target = base.join(rel);
        candidates.push(LinkCandidate {
            target,
            source: entry.into_path(),
            origin: source_root.to_path_buf(),
            reason: LinkReason::new(),
        });
    }

    Ok(candidates)
}
