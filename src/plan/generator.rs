//! Plan generation: validate, scan, filter, merge, remap.
//!
//! Sources are processed in the given order, which is the precedence order:
//! a later layer supplying an already-seen target replaces the earlier
//! contributor. The merge runs over an insertion-ordered map so the final
//! link sequence is identical run-to-run for fixed inputs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::config::{self, SourceConfig};
use crate::error::{ConfigError, PlanError};
use crate::logging::Logger;
use crate::plan::scanner::{self, LinkCandidate, TreeKind};
use crate::plan::{Link, LinkAction, LinkReason, PLAN_VERSION, Plan, Stats};
use crate::platform;

/// Exclude globs declared by one config, scoped to its directory.
#[derive(Debug)]
struct ExcludeMatcher {
    dir: PathBuf,
    globs: GlobSet,
}

/// A `linkFolders` declaration resolved to absolute paths.
#[derive(Debug)]
struct FolderRule {
    /// Absolute path of the folder to link as one unit.
    folder: PathBuf,
    /// Destination the folder maps onto.
    target: PathBuf,
    /// Source layer the folder belongs to.
    origin: PathBuf,
}

/// Generates execution plans from layered source directories.
#[derive(Debug)]
pub struct Generator<'a> {
    log: &'a Logger,
    home: PathBuf,
}

impl<'a> Generator<'a> {
    /// Create a generator resolving destinations against the current user's
    /// home directory.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::NoHomeDir`] when the home directory cannot be
    /// determined.
    pub fn new(log: &'a Logger) -> Result<Self, PlanError> {
        let home = platform::home_dir().ok_or(PlanError::NoHomeDir)?;
        Ok(Self { log, home })
    }

    /// Create a generator with an explicit home directory.
    #[must_use]
    pub const fn with_home(log: &'a Logger, home: PathBuf) -> Self {
        Self { log, home }
    }

    /// Generate an execution plan from `source_paths`, lowest priority
    /// first.
    ///
    /// # Errors
    ///
    /// Fails fast, producing nothing partial, when a source path is
    /// missing or not a directory, when a tree walk fails, or when a config
    /// file is unreadable or malformed.
    pub fn generate(&self, source_paths: &[PathBuf]) -> Result<Plan, PlanError> {
        let sources = resolve_sources(source_paths)?;

        let mut candidates = Vec::new();
        for source in &sources {
            self.log.debug(&format!("processing layer: {}", source.display()));
            candidates.extend(scanner::scan(source, TreeKind::Home, &self.home, self.log)?);
            candidates.extend(scanner::scan(source, TreeKind::Root, &self.home, self.log)?);
        }

        let configs = config::load_all(&sources)?;
        let candidates = self.apply_excludes(candidates, &configs)?;
        let candidates = self.collapse_link_folders(candidates, &configs, &sources);
        let merged = self.merge(candidates);
        let links = self.apply_path_mappings(merged, &configs);

        let overrides = links.iter().filter(|l| l.reason.is_override()).count();
        let stats = Stats {
            total: links.len(),
            new: links.len() - overrides,
            overrides,
            skip: 0,
        };

        Ok(Plan {
            version: PLAN_VERSION.to_string(),
            timestamp: Utc::now(),
            hostname: platform::hostname(),
            sources,
            links,
            stats,
        })
    }

    /// Drop candidates matched by an `exclude` glob of a config that governs
    /// them (the candidate's source lies under the config's directory; the
    /// glob matches the source path relative to that directory).
    fn apply_excludes(
        &self,
        candidates: Vec<LinkCandidate>,
        configs: &BTreeMap<PathBuf, SourceConfig>,
    ) -> Result<Vec<LinkCandidate>, PlanError> {
        let matchers = compile_excludes(configs)?;
        if matchers.is_empty() {
            return Ok(candidates);
        }

        let mut kept = Vec::with_capacity(candidates.len());
        'candidates: for candidate in candidates {
            for matcher in &matchers {
                if let Ok(rel) = candidate.source.strip_prefix(&matcher.dir)
                    && matcher.globs.is_match(rel)
                {
                    self.log
                        .debug(&format!("excluded: {}", candidate.source.display()));
                    continue 'candidates;
                }
            }
            kept.push(candidate);
        }
        Ok(kept)
    }

    /// Replace all candidates under a declared link-folder with a single
    /// folder-level candidate.
    ///
    /// Declarations that do not land inside a layer's `home`/`root` subtree
    /// cannot be mapped to a destination and are ignored with a warning.
    fn collapse_link_folders(
        &self,
        candidates: Vec<LinkCandidate>,
        configs: &BTreeMap<PathBuf, SourceConfig>,
        sources: &[PathBuf],
    ) -> Vec<LinkCandidate> {
        let mut folders = Vec::new();
        for (dir, cfg) in configs {
            for rel in &cfg.link_folders {
                let folder = dir.join(rel);
                match self.folder_rule(&folder, sources) {
                    Some(rule) => folders.push(rule),
                    None => self.log.warn(&format!(
                        "linkFolders entry outside a home/root subtree, ignoring: {}",
                        folder.display()
                    )),
                }
            }
        }
        if folders.is_empty() {
            return candidates;
        }

        let mut emitted: Vec<&FolderRule> = Vec::new();
        let mut collapsed = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let Some(rule) = folders.iter().find(|r| candidate.source.starts_with(&r.folder))
            else {
                collapsed.push(candidate);
                continue;
            };
            if emitted.iter().any(|r| r.folder == rule.folder) {
                continue;
            }
            self.log.debug(&format!(
                "linking folder as one unit: {}",
                rule.folder.display()
            ));
            collapsed.push(LinkCandidate {
                source: rule.folder.clone(),
                target: rule.target.clone(),
                origin: rule.origin.clone(),
                reason: LinkReason::new(),
            });
            emitted.push(rule);
        }
        collapsed
    }

    /// Resolve a link-folder declaration against the layer that contains it.
    fn folder_rule(&self, folder: &Path, sources: &[PathBuf]) -> Option<FolderRule> {
        let origin = sources.iter().find(|layer| folder.starts_with(layer))?;
        let rel = folder.strip_prefix(origin).ok()?;
        let mut components = rel.components();
        let subtree = components.next()?.as_os_str().to_str()?.to_string();
        let remainder = components.as_path();
        if remainder.as_os_str().is_empty() {
            return None;
        }
        let base = match subtree.as_str() {
            "home" => self.home.clone(),
            "root" => PathBuf::from("/"),
            _ => return None,
        };
        Some(FolderRule {
            folder: folder.to_path_buf(),
            target: base.join(remainder),
            origin: origin.clone(),
        })
    }

    /// Merge candidates by target; the last contributor wins, the first
    /// occurrence fixes the output position.
    fn merge(&self, candidates: Vec<LinkCandidate>) -> Vec<LinkCandidate> {
        let mut by_target: IndexMap<PathBuf, LinkCandidate> = IndexMap::new();
        for candidate in candidates {
            match by_target.entry(candidate.target.clone()) {
                Entry::Occupied(mut slot) => {
                    let layer = layer_basename(&candidate.origin);
                    self.log
                        .debug(&format!("override: {}", candidate.target.display()));
                    let entry = slot.get_mut();
                    entry.source = candidate.source;
                    entry.origin = candidate.origin;
                    entry.reason = LinkReason::override_from(layer);
                }
                Entry::Vacant(slot) => {
                    self.log
                        .debug(&format!("new: {}", candidate.target.display()));
                    slot.insert(candidate);
                }
            }
        }
        by_target.into_values().collect()
    }

    /// Rewrite targets according to every config's path mappings, in sorted
    /// config-path order; later configs compound on earlier rewrites.
    fn apply_path_mappings(
        &self,
        mut entries: Vec<LinkCandidate>,
        configs: &BTreeMap<PathBuf, SourceConfig>,
    ) -> Vec<Link> {
        for (dir, cfg) in configs {
            if cfg.path_mappings.is_empty() {
                continue;
            }
            let config_name = layer_basename(dir);
            for entry in &mut entries {
                for mapping in &cfg.path_mappings {
                    let Some(rel) = relative_key(&entry.target, &self.home) else {
                        continue;
                    };
                    let Some(rest) = rel.strip_prefix(mapping.source.as_str()) else {
                        continue;
                    };
                    let rewritten = expand_tilde(&format!("{}{rest}", mapping.target), &self.home);
                    self.log.debug(&format!(
                        "remap: {} -> {}",
                        entry.target.display(),
                        rewritten.display()
                    ));
                    entry.target = rewritten;
                    entry.reason.add_remap(config_name.clone());
                }
            }
        }

        entries
            .into_iter()
            .map(|c| Link {
                source: c.source,
                target: c.target,
                action: LinkAction::Link,
                reason: c.reason,
            })
            .collect()
    }
}

/// Validate and canonicalize the input source paths, preserving order.
fn resolve_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>, PlanError> {
    let mut resolved = Vec::with_capacity(paths.len());
    for path in paths {
        let meta = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlanError::SourceMissing(path.clone())
            } else {
                PlanError::Scan {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;
        if !meta.is_dir() {
            return Err(PlanError::NotADirectory(path.clone()));
        }
        let abs = std::fs::canonicalize(path).map_err(|e| PlanError::Scan {
            path: path.clone(),
            source: e,
        })?;
        resolved.push(abs);
    }
    Ok(resolved)
}

/// Compile the per-config exclude globs.
fn compile_excludes(
    configs: &BTreeMap<PathBuf, SourceConfig>,
) -> Result<Vec<ExcludeMatcher>, ConfigError> {
    let mut matchers = Vec::new();
    for (dir, cfg) in configs {
        if cfg.exclude.is_empty() {
            continue;
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in &cfg.exclude {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::Glob {
                path: dir.clone(),
                pattern: pattern.clone(),
                source: e,
            })?;
            builder.add(glob);
        }
        let globs = builder.build().map_err(|e| ConfigError::Glob {
            path: dir.clone(),
            pattern: cfg.exclude.join(", "),
            source: e,
        })?;
        matchers.push(ExcludeMatcher {
            dir: dir.clone(),
            globs,
        });
    }
    Ok(matchers)
}

/// Directory basename used in provenance annotations.
fn layer_basename(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// A target's path relative to the home directory, or to `/` when it is not
/// under home. `None` for targets under neither (relative paths).
fn relative_key(target: &Path, home: &Path) -> Option<String> {
    let rel = target
        .strip_prefix(home)
        .or_else(|_| target.strip_prefix("/"))
        .ok()?;
    Some(rel.to_string_lossy().into_owned())
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    path.strip_prefix('~').map_or_else(
        || PathBuf::from(path),
        |rest| home.join(rest.trim_start_matches('/')),
    )
}
