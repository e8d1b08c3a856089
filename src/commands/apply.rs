//! The `apply` subcommand.

use std::path::PathBuf;

use anyhow::Result;

use crate::apply::{Applier, ApplyOptions};
use crate::cli::{GlobalOpts, PlanFileOpts};
use crate::logging::Logger;
use crate::plan::store;

/// Read a plan file and apply it.
///
/// Per-link failures are counted, not raised; only plan-file problems error.
///
/// # Errors
///
/// Returns an error when the plan file cannot be read or parsed.
pub fn run(global: &GlobalOpts, opts: &PlanFileOpts, log: &Logger) -> Result<()> {
    let plan_file = opts
        .plan_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(super::DEFAULT_PLAN_FILE));
    let plan = store::read_plan(&plan_file)?;

    let options = ApplyOptions {
        dry_run: global.dry_run,
        backup: global.backup,
        verbose: global.verbose,
    };
    let applier = Applier::new(log);
    applier.apply(&plan, options);
    Ok(())
}
