//! The `deploy` subcommand: plan and apply in one step.

use anyhow::Result;

use crate::apply::{Applier, ApplyOptions};
use crate::cli::{DeployOpts, GlobalOpts};
use crate::logging::Logger;
use crate::plan::{Generator, store};

/// Generate a plan, persist it to a temporary file for inspection, and
/// apply it immediately.
///
/// # Errors
///
/// Returns an error when source resolution or plan generation fails; apply
/// failures are counted per link, as in the `apply` subcommand.
pub fn run(global: &GlobalOpts, opts: &DeployOpts, log: &Logger) -> Result<()> {
    let sources = super::source_paths(global, &opts.paths, log)?;

    log.stage("Generating execution plan");
    let generator = Generator::new(log)?;
    let plan = generator.generate(&sources)?;

    let tmp_plan =
        std::env::temp_dir().join(format!("dotlink-deploy-{}.json", std::process::id()));
    store::write_plan(&tmp_plan, &plan)?;

    let options = ApplyOptions {
        dry_run: global.dry_run,
        backup: global.backup,
        verbose: global.verbose,
    };
    let applier = Applier::new(log);
    applier.apply(&plan, options);

    let _ = std::fs::remove_file(&tmp_plan);
    Ok(())
}
