//! Metric groups: which columns share a chart, and under which unit label.
//!
//! Config format, one directive per line:
//!
//! ```text
//! ### Memory,KB        <- start group "Memory" with unit "KB"
//! ###                  <- start an unnamed group (charted by index)
//! vMemoryUsed          <- metric in the current group
//!   #vMemoryFree       <- excluded metric (group stays open)
//! # free-form comment
//! ```
//!
//! Metrics listed before the first header belong to the reserved "Unknown"
//! bucket, which is never rendered.

use crate::table::SampleTable;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const UNKNOWN_GROUP: &str = "Unknown";
pub const UNSPECIFIED_UNIT: &str = "Unspecified";
pub const DEFAULT_CONFIG_FILE: &str = "graph.default.cfg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricGroup {
    pub name: String,
    pub unit: String,
    pub metrics: Vec<String>,
}

impl MetricGroup {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            metrics: Vec::new(),
        }
    }
}

/// Parse a group config. Metrics before the first header are ignored.
pub fn parse_group_config(text: &str) -> Vec<MetricGroup> {
    let mut groups: Vec<MetricGroup> = Vec::new();
    // None = the Unknown bucket
    let mut current: Option<usize> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if let Some(header) = line.strip_prefix("###") {
            let mut parts = header.split(',');
            // a bare `###` opens an unnamed group, charted by its index
            let name = parts.next().unwrap_or("").trim();
            let unit = parts
                .next()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .unwrap_or(UNSPECIFIED_UNIT);
            let group = MetricGroup::new(name, unit);
            // a redeclared group replaces the earlier one in place
            current = Some(match groups.iter().position(|g| g.name == name) {
                Some(i) => {
                    groups[i] = group;
                    i
                }
                None => {
                    groups.push(group);
                    groups.len() - 1
                }
            });
        } else if line.is_empty() || line.starts_with('#') {
            // comment, or an excluded metric; the current group stays open
            continue;
        } else {
            match current {
                Some(i) => groups[i].metrics.push(line.to_string()),
                None => debug!(metric = line, "metric outside any group; ignored"),
            }
        }
    }
    groups.retain(|g| g.name != UNKNOWN_GROUP);
    groups
}

pub fn load_group_config(path: &Path) -> io::Result<Vec<MetricGroup>> {
    Ok(parse_group_config(&fs::read_to_string(path)?))
}

/// Used when no config can be read: one group holding every numeric column.
pub fn fallback_groups(table: &SampleTable) -> Vec<MetricGroup> {
    let mut g = MetricGroup::new("All", UNSPECIFIED_UNIT);
    g.metrics = table.numeric_names().map(str::to_string).collect();
    vec![g]
}

/// `$XDG_CONFIG_HOME/ruprof` (fallback `~/.config/ruprof`).
pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("ruprof")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ruprof")
    }
}

/// First existing of `./graph.default.cfg` and `<config_dir>/graph.cfg`.
pub fn default_config_path() -> Option<PathBuf> {
    [PathBuf::from(DEFAULT_CONFIG_FILE), config_dir().join("graph.cfg")]
        .into_iter()
        .find(|p| p.is_file())
}

/// Resolve the groups to render: explicit path, else the default locations,
/// else [`fallback_groups`].
pub fn resolve_groups(explicit: Option<&Path>, table: &SampleTable) -> Vec<MetricGroup> {
    let path = explicit.map(Path::to_path_buf).or_else(default_config_path);
    match path {
        Some(p) => match load_group_config(&p) {
            Ok(groups) => groups,
            Err(e) => {
                warn!(
                    "group config {} unreadable ({e}); charting every numeric column",
                    p.display()
                );
                fallback_groups(table)
            }
        },
        None => fallback_groups(table),
    }
}
