//! Per-directory source configuration (`.dotlink.json`).
//!
//! A source layer (and any subdirectory beneath it) may carry a small JSON
//! config declaring path mappings, exclude globs, folders to link as a
//! single unit, and pre/post-apply hook commands. Absence of the file means
//! an empty config; malformed JSON is an error with the path attached.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the per-directory configuration.
pub const CONFIG_FILE_NAME: &str = ".dotlink.json";

/// A source-to-target path rewrite rule.
///
/// `source` is matched as a prefix of a link target's path relative to the
/// home directory (or `/`); `target` replaces the matched prefix and may
/// start with `~`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    /// Relative-path prefix to match.
    pub source: String,
    /// Replacement prefix; a leading `~` expands to the home directory.
    pub target: String,
}

/// Commands to run before and after applying a plan.
///
/// Declared in the schema for forward compatibility; the engine parses and
/// carries them but does not execute them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hooks {
    /// Shell command to run before apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_apply: Option<String>,
    /// Shell command to run after apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_apply: Option<String>,
}

/// Optional per-directory settings, immutable after load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceConfig {
    /// Config schema version, informational.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Ordered rewrite rules applied to link targets.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path_mappings: Vec<PathMapping>,
    /// Glob patterns dropping matching candidates before the merge.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Folders (relative to this config's directory) linked as one unit
    /// instead of file-by-file.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub link_folders: Vec<String>,
    /// Pre/post-apply hook commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Hooks>,
}

impl SourceConfig {
    /// Whether the config declares nothing at all.
    ///
    /// Empty subdirectory configs are omitted from [`load_all`] results.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.version.is_none()
            && self.path_mappings.is_empty()
            && self.exclude.is_empty()
            && self.link_folders.is_empty()
            && self.hooks.is_none()
    }
}

/// Load the configuration co-located in `dir`.
///
/// A missing config file yields the default (empty) config.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file exists but cannot be read and
/// [`ConfigError::Parse`] when it contains invalid JSON.
pub fn load(dir: &Path) -> Result<SourceConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let data = match std::fs::read(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SourceConfig::default()),
        Err(e) => return Err(ConfigError::Io { path, source: e }),
    };
    serde_json::from_slice(&data).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Load configurations for every source root and every qualifying
/// subdirectory beneath it.
///
/// Root configs are always included, even when empty; a subdirectory config
/// is included only when it declares something. The returned map is sorted
/// by directory path, which fixes the processing order for remap rules.
///
/// # Errors
///
/// Propagates the first read, parse, or directory-walk failure.
pub fn load_all(roots: &[PathBuf]) -> Result<BTreeMap<PathBuf, SourceConfig>, ConfigError> {
    let mut configs = BTreeMap::new();
    for root in roots {
        configs.insert(root.clone(), load(root)?);
        configs.extend(subdir_configs(root)?);
    }
    Ok(configs)
}

/// Collect non-empty configs from every subdirectory of `root`.
///
/// Iterative queue traversal; returns the accumulated mapping rather than
/// threading a mutable collection through recursive frames.
fn subdir_configs(root: &Path) -> Result<BTreeMap<PathBuf, SourceConfig>, ConfigError> {
    let mut found = BTreeMap::new();
    let mut queue = vec![root.to_path_buf()];

    while let Some(dir) = queue.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| ConfigError::Io {
            path: dir.clone(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::Io {
                path: dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            // Do not follow symlinked directories out of the layer.
            let is_dir = entry
                .file_type()
                .map(|t| t.is_dir())
                .map_err(|e| ConfigError::Io {
                    path: path.clone(),
                    source: e,
                })?;
            if !is_dir {
                continue;
            }
            let config = load(&path)?;
            if !config.is_empty() {
                found.insert(path.clone(), config);
            }
            queue.push(path);
        }
    }

    Ok(found)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, json: &str) {
        std::fs::write(dir.join(CONFIG_FILE_NAME), json).expect("write config");
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path()).unwrap();
        assert_eq!(config, SourceConfig::default());
        assert!(config.is_empty());
    }

    #[test]
    fn load_parses_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{
                "version": "1",
                "pathMappings": [{"source": ".config/nvim", "target": "~/.nvim"}],
                "exclude": ["*.swp"],
                "linkFolders": ["home/.config/nvim"],
                "hooks": {"preApply": "echo pre", "postApply": "echo post"}
            }"#,
        );

        let config = load(dir.path()).unwrap();
        assert_eq!(config.version.as_deref(), Some("1"));
        assert_eq!(
            config.path_mappings,
            vec![PathMapping {
                source: ".config/nvim".to_string(),
                target: "~/.nvim".to_string(),
            }]
        );
        assert_eq!(config.exclude, vec!["*.swp"]);
        assert_eq!(config.link_folders, vec!["home/.config/nvim"]);
        let hooks = config.hooks.expect("hooks present");
        assert_eq!(hooks.pre_apply.as_deref(), Some("echo pre"));
        assert_eq!(hooks.post_apply.as_deref(), Some("echo post"));
    }

    #[test]
    fn load_malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "{ not json");

        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn load_unknown_fields_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), r#"{"version": "2", "future": true}"#);
        let config = load(dir.path()).unwrap();
        assert_eq!(config.version.as_deref(), Some("2"));
    }

    #[test]
    fn load_all_includes_empty_root_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let configs = load_all(std::slice::from_ref(&root)).unwrap();
        assert_eq!(configs.len(), 1);
        assert!(configs.get(&root).expect("root config").is_empty());
    }

    #[test]
    fn load_all_skips_empty_subdir_configs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let empty_sub = root.join("home");
        std::fs::create_dir_all(&empty_sub).unwrap();
        write_config(&empty_sub, "{}");

        let full_sub = root.join("home/.config");
        std::fs::create_dir_all(&full_sub).unwrap();
        write_config(&full_sub, r#"{"exclude": ["*.bak"]}"#);

        let configs = load_all(std::slice::from_ref(&root)).unwrap();
        assert_eq!(configs.len(), 2, "root plus the one non-empty subdir");
        assert!(configs.contains_key(&root));
        assert!(configs.contains_key(&full_sub));
        assert!(!configs.contains_key(&empty_sub));
    }

    #[test]
    fn load_all_result_is_sorted_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        for name in ["zeta", "alpha", "mid"] {
            let sub = root.join(name);
            std::fs::create_dir_all(&sub).unwrap();
            write_config(&sub, r#"{"version": "1"}"#);
        }

        let configs = load_all(std::slice::from_ref(&root)).unwrap();
        let keys: Vec<_> = configs.keys().cloned().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = SourceConfig {
            version: Some("1".to_string()),
            path_mappings: vec![PathMapping {
                source: "a".to_string(),
                target: "b".to_string(),
            }],
            exclude: vec!["*.tmp".to_string()],
            link_folders: vec!["home/x".to_string()],
            hooks: Some(Hooks {
                pre_apply: Some("true".to_string()),
                post_apply: None,
            }),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SourceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
