//! The `check` subcommand.

use std::path::PathBuf;

use anyhow::Result;

use crate::check::{self, CheckReport};
use crate::cli::{GlobalOpts, PlanFileOpts};
use crate::logging::Logger;
use crate::plan::store;

/// Read a plan file, verify it against the filesystem, and print the
/// report. Returns whether every link checked out OK; the caller turns
/// that into the process exit code.
///
/// # Errors
///
/// Returns an error when the plan file cannot be read or parsed.
pub fn run(global: &GlobalOpts, opts: &PlanFileOpts, log: &Logger) -> Result<bool> {
    let plan_file = opts
        .plan_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(super::DEFAULT_PLAN_FILE));
    let plan = store::read_plan(&plan_file)?;

    let report = check::check_plan(&plan);
    print_report(&report, global.verbose);

    if !report.all_ok {
        log.warn(&format!(
            "{} of {} links need attention",
            report.total - report.by_status.get(&check::LinkStatus::Ok).copied().unwrap_or(0),
            report.total
        ));
    }
    Ok(report.all_ok)
}

/// Print one `STATUS\ttarget\tsource` line per link; with `verbose`, the
/// classification detail is appended.
#[allow(clippy::print_stdout)]
fn print_report(report: &CheckReport, verbose: bool) {
    for result in &report.results {
        if verbose {
            println!(
                "{}\t{}\t{}\t{}",
                result.status,
                result.link.target.display(),
                result.link.source.display(),
                result.detail
            );
        } else {
            println!(
                "{}\t{}\t{}",
                result.status,
                result.link.target.display(),
                result.link.source.display()
            );
        }
    }
}
