//! Subcommand orchestration: thin glue between the CLI and the engine.

pub mod apply;
pub mod check;
pub mod deploy;
pub mod plan;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::platform;

/// Default plan file consumed by `apply` and `check`.
pub const DEFAULT_PLAN_FILE: &str = "./dotlink-plan.json";

/// Resolve the source layers for plan generation.
///
/// Explicit paths win. Otherwise layers are auto-discovered from the base
/// directory (`--base` flag or `DOTLINK_BASE` env var) as
/// `<base>/share` (low priority) plus `<base>/<hostname>` (high priority).
///
/// # Errors
///
/// Fails when no paths are given and no base directory is configured.
pub fn source_paths(
    global: &GlobalOpts,
    paths: &[PathBuf],
    log: &Logger,
) -> Result<Vec<PathBuf>> {
    if !paths.is_empty() {
        return Ok(paths.to_vec());
    }

    let base = global
        .base
        .clone()
        .or_else(|| std::env::var_os("DOTLINK_BASE").map(PathBuf::from))
        .context("no source paths specified and DOTLINK_BASE not set")?;

    let hostname = platform::hostname();
    let discovered = vec![base.join("share"), base.join(&hostname)];
    log.debug(&format!(
        "auto-discovered layers: {} {}",
        base.join("share").display(),
        base.join(&hostname).display()
    ));
    Ok(discovered)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn opts(base: Option<&str>) -> GlobalOpts {
        GlobalOpts {
            verbose: false,
            dry_run: false,
            backup: false,
            base: base.map(PathBuf::from),
        }
    }

    #[test]
    fn explicit_paths_win() {
        let log = Logger::new(false);
        let paths = vec![PathBuf::from("/a")];
        let resolved = source_paths(&opts(Some("/layers")), &paths, &log).unwrap();
        assert_eq!(resolved, paths);
    }

    #[test]
    fn base_flag_discovers_share_and_host_layers() {
        let log = Logger::new(false);
        let resolved = source_paths(&opts(Some("/layers")), &[], &log).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0], PathBuf::from("/layers/share"));
        assert!(resolved[1].starts_with("/layers"));
        assert_ne!(resolved[1], PathBuf::from("/layers/share"));
    }

    #[test]
    fn share_layer_comes_first_so_host_overrides() {
        let log = Logger::new(false);
        let resolved = source_paths(&opts(Some("/layers")), &[], &log).unwrap();
        assert_eq!(resolved[0].file_name().unwrap(), "share");
    }
}
