//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the dotlink engine.
#[derive(Parser, Debug)]
#[command(
    name = "dotlink",
    about = "Layered dotfiles symlink manager: plan, apply, check",
    version
)]
pub struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared across subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
///
/// Threaded explicitly into the engine entry points; never held as ambient
/// process-wide state.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show what would be done without executing
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Backup existing files before overwriting
    #[arg(short = 'b', long, global = true)]
    pub backup: bool,

    /// Base configuration directory (overrides DOTLINK_BASE)
    #[arg(long, global = true)]
    pub base: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an execution plan from source directories
    Plan(PlanOpts),
    /// Apply an execution plan to create symlinks
    Apply(PlanFileOpts),
    /// Generate and apply a plan in one step
    Deploy(DeployOpts),
    /// Check whether all links in a plan are correctly applied
    Check(PlanFileOpts),
    /// Print version information
    Version,
}

/// Options for the `plan` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct PlanOpts {
    /// Source directories, lowest priority first; auto-discovered from
    /// DOTLINK_BASE when omitted
    pub paths: Vec<PathBuf>,

    /// Output plan file
    #[arg(short, long, default_value = "./dotlink-plan.json")]
    pub output: PathBuf,
}

/// Options for subcommands that consume an existing plan file.
#[derive(Parser, Debug, Clone)]
pub struct PlanFileOpts {
    /// Plan file (defaults to ./dotlink-plan.json)
    pub plan_file: Option<PathBuf>,
}

/// Options for the `deploy` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct DeployOpts {
    /// Source directories, lowest priority first; auto-discovered from
    /// DOTLINK_BASE when omitted
    pub paths: Vec<PathBuf>,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_plan_with_paths_and_output() {
        let cli = Cli::parse_from(["dotlink", "plan", "/a", "/b", "-o", "/tmp/p.json"]);
        assert!(
            matches!(&cli.command, Command::Plan(_)),
            "Expected Plan command"
        );
        if let Command::Plan(opts) = cli.command {
            assert_eq!(opts.paths, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
            assert_eq!(opts.output, PathBuf::from("/tmp/p.json"));
        }
    }

    #[test]
    fn plan_output_has_a_default() {
        let cli = Cli::parse_from(["dotlink", "plan"]);
        assert!(
            matches!(&cli.command, Command::Plan(_)),
            "Expected Plan command"
        );
        if let Command::Plan(opts) = cli.command {
            assert!(opts.paths.is_empty());
            assert_eq!(opts.output, PathBuf::from("./dotlink-plan.json"));
        }
    }

    #[test]
    fn parse_apply_with_plan_file() {
        let cli = Cli::parse_from(["dotlink", "apply", "my-plan.json"]);
        assert!(
            matches!(&cli.command, Command::Apply(_)),
            "Expected Apply command"
        );
        if let Command::Apply(opts) = cli.command {
            assert_eq!(opts.plan_file, Some(PathBuf::from("my-plan.json")));
        }
    }

    #[test]
    fn parse_check_without_plan_file() {
        let cli = Cli::parse_from(["dotlink", "check"]);
        assert!(
            matches!(&cli.command, Command::Check(_)),
            "Expected Check command"
        );
        if let Command::Check(opts) = cli.command {
            assert!(opts.plan_file.is_none());
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["dotlink", "-v", "-d", "-b", "apply"]);
        assert!(cli.global.verbose);
        assert!(cli.global.dry_run);
        assert!(cli.global.backup);
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::parse_from(["dotlink", "deploy", "--dry-run", "/a"]);
        assert!(cli.global.dry_run);
        assert!(
            matches!(&cli.command, Command::Deploy(_)),
            "Expected Deploy command"
        );
        if let Command::Deploy(opts) = cli.command {
            assert_eq!(opts.paths, vec![PathBuf::from("/a")]);
        }
    }

    #[test]
    fn parse_base_override() {
        let cli = Cli::parse_from(["dotlink", "--base", "/layers", "plan"]);
        assert_eq!(cli.global.base, Some(PathBuf::from("/layers")));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["dotlink", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }
}
