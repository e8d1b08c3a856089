//! Plan data model: links, provenance, statistics.
//!
//! A [`Plan`] is the persisted, reviewable set of symlink operations
//! produced by the [`Generator`](generator::Generator) and consumed by the
//! applier and checker. The JSON wire format is fixed; see [`store`] for
//! persistence.

pub mod generator;
pub mod scanner;
pub mod store;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use generator::Generator;

/// Version string stamped into generated plans.
///
/// Identifies the plan format, independent of the binary version.
pub const PLAN_VERSION: &str = "1.0.0";

/// How a link's final source/target pair was determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReasonBase {
    /// First (and only) contributor for this target.
    New,
    /// A later layer replaced an earlier contributor; carries the layer's
    /// directory basename.
    OverrideFrom(String),
}

/// Provenance of a link: override origin plus any remap annotations.
///
/// Replaces the free-text reason string of the legacy plan format with a
/// tagged value; the legacy string (`"new"`, `"override from <layer>"`,
/// with `" (remapped by <name>)"` suffixes) is produced by [`fmt::Display`]
/// and accepted by [`FromStr`], so persisted plans are unchanged on the
/// wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReason {
    base: ReasonBase,
    remapped_by: Vec<String>,
}

impl LinkReason {
    /// Provenance of a freshly discovered link.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: ReasonBase::New,
            remapped_by: Vec::new(),
        }
    }

    /// Provenance of a link overridden by `layer`.
    #[must_use]
    pub fn override_from(layer: impl Into<String>) -> Self {
        Self {
            base: ReasonBase::OverrideFrom(layer.into()),
            remapped_by: Vec::new(),
        }
    }

    /// The override/new tag.
    #[must_use]
    pub const fn base(&self) -> &ReasonBase {
        &self.base
    }

    /// Names of configs whose path mappings rewrote this link's target,
    /// in application order.
    #[must_use]
    pub fn remapped_by(&self) -> &[String] {
        &self.remapped_by
    }

    /// Record that `config_name`'s path mapping rewrote the target.
    ///
    /// Consecutive duplicates collapse, so several rules from one config
    /// leave a single annotation.
    pub fn add_remap(&mut self, config_name: impl Into<String>) {
        let name = config_name.into();
        if self.remapped_by.last() != Some(&name) {
            self.remapped_by.push(name);
        }
    }

    /// Whether this link overrides an earlier layer's contribution.
    #[must_use]
    pub const fn is_override(&self) -> bool {
        matches!(self.base, ReasonBase::OverrideFrom(_))
    }
}

impl Default for LinkReason {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LinkReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            ReasonBase::New => f.write_str("new")?,
            ReasonBase::OverrideFrom(layer) => write!(f, "override from {layer}")?,
        }
        for name in &self.remapped_by {
            write!(f, " (remapped by {name})")?;
        }
        Ok(())
    }
}

/// Error parsing a reason string that is neither `new` nor an override.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized link reason: '{0}'")]
pub struct ParseReasonError(String);

impl FromStr for LinkReason {
    type Err = ParseReasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim();
        let mut remapped_by = Vec::new();
        while let Some(stripped) = rest.strip_suffix(')') {
            let Some((head, name)) = stripped.rsplit_once(" (remapped by ") else {
                break;
            };
            remapped_by.push(name.to_string());
            rest = head;
        }
        remapped_by.reverse();

        let base = if rest == "new" {
            ReasonBase::New
        } else if let Some(layer) = rest.strip_prefix("override from ") {
            ReasonBase::OverrideFrom(layer.to_string())
        } else {
            return Err(ParseReasonError(s.to_string()));
        };

        Ok(Self { base, remapped_by })
    }
}

impl Serialize for LinkReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LinkReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// The operation a link entry performs. Only symlink creation exists today;
/// the field is kept on the wire for forward compatibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkAction {
    /// Create a symlink at `target` pointing to `source`.
    #[default]
    Link,
}

/// One persisted symlink operation.
///
/// `source` must exist at apply time (not guaranteed at plan time);
/// `target` is where the symlink is created. Immutable once in a [`Plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute path the symlink will point to.
    pub source: PathBuf,
    /// Absolute path the symlink will be created at.
    pub target: PathBuf,
    /// Operation kind.
    pub action: LinkAction,
    /// Provenance of the final source/target pair.
    pub reason: LinkReason,
}

/// Plan-level counters.
///
/// `total == new + override`; `skip` is reserved for apply-time discoveries
/// and is always zero at generation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of links in the plan.
    pub total: usize,
    /// Links whose target had a single contributor.
    pub new: usize,
    /// Links whose target was overridden by a later layer.
    #[serde(rename = "override")]
    pub overrides: usize,
    /// Reserved; populated only at apply time.
    pub skip: usize,
}

/// The serialized, reviewable set of link operations to perform.
///
/// Immutable once written; re-generation produces a wholly new plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan format version.
    pub version: String,
    /// Creation instant (RFC 3339).
    pub timestamp: DateTime<Utc>,
    /// Hostname of the generating machine; informational only.
    pub hostname: String,
    /// Ordered source layers, lowest priority first.
    pub sources: Vec<PathBuf>,
    /// Link operations; order is stable but not semantically significant.
    pub links: Vec<Link>,
    /// Summary counters.
    pub stats: Stats,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    #[test]
    fn reason_new_renders_and_parses() {
        let reason = LinkReason::new();
        assert_eq!(reason.to_string(), "new");
        assert_eq!("new".parse::<LinkReason>().unwrap(), reason);
        assert!(!reason.is_override());
    }

    #[test]
    fn reason_override_renders_and_parses() {
        let reason = LinkReason::override_from("host");
        assert_eq!(reason.to_string(), "override from host");
        let parsed: LinkReason = "override from host".parse().unwrap();
        assert_eq!(parsed, reason);
        assert!(parsed.is_override());
    }

    #[test]
    fn reason_remap_suffixes_compound() {
        let mut reason = LinkReason::override_from("host");
        reason.add_remap("share");
        reason.add_remap("nvim");
        assert_eq!(
            reason.to_string(),
            "override from host (remapped by share) (remapped by nvim)"
        );

        let parsed: LinkReason = reason.to_string().parse().unwrap();
        assert_eq!(parsed, reason);
        assert_eq!(parsed.remapped_by(), ["share", "nvim"]);
    }

    #[test]
    fn reason_consecutive_duplicate_remaps_collapse() {
        let mut reason = LinkReason::new();
        reason.add_remap("share");
        reason.add_remap("share");
        assert_eq!(reason.to_string(), "new (remapped by share)");
    }

    #[test]
    fn reason_rejects_unknown_strings() {
        assert!("definitely not a reason".parse::<LinkReason>().is_err());
        assert!("".parse::<LinkReason>().is_err());
    }

    #[test]
    fn reason_with_layer_name_containing_parens_round_trips() {
        let reason = LinkReason::override_from("host (backup)");
        let parsed: LinkReason = reason.to_string().parse().unwrap();
        assert_eq!(parsed, reason);
    }

    fn sample_plan() -> Plan {
        let mut reason = LinkReason::override_from("host");
        reason.add_remap("share");
        Plan {
            version: PLAN_VERSION.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            hostname: "unknown".to_string(),
            sources: vec![PathBuf::from("/layers/share"), PathBuf::from("/layers/host")],
            links: vec![Link {
                source: PathBuf::from("/layers/host/home/.bashrc"),
                target: PathBuf::from("/home/user/.bashrc"),
                action: LinkAction::Link,
                reason,
            }],
            stats: Stats {
                total: 1,
                new: 0,
                overrides: 1,
                skip: 0,
            },
        }
    }

    #[test]
    fn plan_serializes_to_the_legacy_wire_format() {
        let json = serde_json::to_string_pretty(&sample_plan()).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "version": "1.0.0",
          "timestamp": "2024-01-15T10:30:00Z",
          "hostname": "unknown",
          "sources": [
            "/layers/share",
            "/layers/host"
          ],
          "links": [
            {
              "source": "/layers/host/home/.bashrc",
              "target": "/home/user/.bashrc",
              "action": "link",
              "reason": "override from host (remapped by share)"
            }
          ],
          "stats": {
            "total": 1,
            "new": 0,
            "override": 1,
            "skip": 0
          }
        }
        "#);
    }

    #[test]
    fn plan_round_trips_through_json() {
        let plan = sample_plan();
        let json = serde_json::to_string_pretty(&plan).unwrap();
        let back: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn plan_parses_legacy_reason_strings() {
        let json = r#"{
            "version": "1.0.0",
            "timestamp": "2023-06-01T00:00:00Z",
            "hostname": "box",
            "sources": ["/s"],
            "links": [
                {"source": "/s/home/.vimrc", "target": "/home/u/.vimrc", "action": "link", "reason": "new"}
            ],
            "stats": {"total": 1, "new": 1, "override": 0, "skip": 0}
        }"#;
        let plan: Plan = serde_json::from_str(json).unwrap();
        let link = plan.links.first().expect("one link");
        assert_eq!(link.reason, LinkReason::new());
        assert_eq!(plan.stats.new, 1);
    }
}
