//! The `plan` subcommand.

use anyhow::Result;

use crate::cli::{GlobalOpts, PlanOpts};
use crate::logging::Logger;
use crate::plan::{Generator, store};

/// Generate a plan from the configured source layers and write it to disk.
///
/// # Errors
///
/// Returns an error when source resolution, generation, or writing the plan
/// file fails.
pub fn run(global: &GlobalOpts, opts: &PlanOpts, log: &Logger) -> Result<()> {
    let sources = super::source_paths(global, &opts.paths, log)?;

    log.stage("Generating execution plan");
    let generator = Generator::new(log)?;
    let plan = generator.generate(&sources)?;
    store::write_plan(&opts.output, &plan)?;

    log.info(&format!("plan written: {}", opts.output.display()));
    log.info(&format!(
        "  total: {} ({} new, {} override)",
        plan.stats.total, plan.stats.new, plan.stats.overrides
    ));

    if global.verbose {
        for link in &plan.links {
            log.debug(&format!(
                "  {} -> {} ({})",
                link.target.display(),
                link.source.display(),
                link.reason
            ));
        }
    }

    Ok(())
}
