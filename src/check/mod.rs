//! Read-only verification of a plan against the filesystem.
//!
//! Classifies every link into one of five statuses without mutating
//! anything; the aggregate `all_ok` flag is the sole input to the CLI's
//! exit-code decision.

use std::collections::BTreeMap;
use std::fmt;

use crate::plan::{Link, Plan};

/// Classification of a single link's on-disk state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkStatus {
    /// Target is a symlink pointing at the recorded source.
    Ok,
    /// Target does not exist (or cannot be stat'ed).
    Missing,
    /// Target is a symlink pointing somewhere else (or unreadable).
    WrongLink,
    /// Target exists but is not a symlink.
    NotSymlink,
    /// The recorded source file does not exist.
    SourceMissing,
}

impl LinkStatus {
    /// Fixed-width label used in report output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Missing => "MISSING",
            Self::WrongLink => "WRONG_LINK",
            Self::NotSymlink => "NOT_SYMLINK",
            Self::SourceMissing => "SOURCE_MISSING",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of one link, with human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// The link that was checked.
    pub link: Link,
    /// Its classification.
    pub status: LinkStatus,
    /// Supporting detail (actual link value, stat error, …).
    pub detail: String,
}

/// Aggregate report over a whole plan. Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Number of links checked.
    pub total: usize,
    /// Count per status.
    pub by_status: BTreeMap<LinkStatus, usize>,
    /// Per-link results, in plan order.
    pub results: Vec<CheckResult>,
    /// True iff every link is [`LinkStatus::Ok`].
    pub all_ok: bool,
}

/// Verify every link in `plan` against the current filesystem.
///
/// Pure read; never mutates anything.
#[must_use]
pub fn check_plan(plan: &Plan) -> CheckReport {
    let mut report = CheckReport {
        total: plan.links.len(),
        by_status: BTreeMap::new(),
        results: Vec::with_capacity(plan.links.len()),
        all_ok: true,
    };

    for link in &plan.links {
        let result = check_link(link);
        *report.by_status.entry(result.status).or_insert(0) += 1;
        if result.status != LinkStatus::Ok {
            report.all_ok = false;
        }
        report.results.push(result);
    }

    report
}

/// Classify a single link; evaluation order is fixed, first match wins.
fn check_link(link: &Link) -> CheckResult {
    let result = |status, detail: String| CheckResult {
        link: link.clone(),
        status,
        detail,
    };

    if !link.source.exists() {
        return result(
            LinkStatus::SourceMissing,
            format!("source file does not exist: {}", link.source.display()),
        );
    }

    // Lstat: a broken symlink at the target still counts as present.
    let meta = match link.target.symlink_metadata() {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return result(LinkStatus::Missing, "target does not exist".to_string());
        }
        Err(e) => {
            return result(LinkStatus::Missing, format!("failed to stat target: {e}"));
        }
        Ok(meta) => meta,
    };

    if !meta.file_type().is_symlink() {
        return result(
            LinkStatus::NotSymlink,
            "target exists but is not a symlink".to_string(),
        );
    }

    match std::fs::read_link(&link.target) {
        Err(e) => result(LinkStatus::WrongLink, format!("failed to read symlink: {e}")),
        Ok(actual) if actual == link.source => {
            result(LinkStatus::Ok, "correctly linked".to_string())
        }
        Ok(actual) => result(
            LinkStatus::WrongLink,
            format!("points to: {}", actual.display()),
        ),
    }
}
