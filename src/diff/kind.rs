//! Diff kinds selectable on the command line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which comparison to run between two images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Build history steps
    #[default]
    History,
    /// Filesystem entries and contents
    Filesystem,
    /// Debian packages from the dpkg database
    Apt,
    /// Node packages from `node_modules` across layers
    Node,
}

impl DiffKind {
    /// Every kind, in the order they are documented.
    pub const ALL: [Self; 4] = [Self::History, Self::Filesystem, Self::Apt, Self::Node];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::History => "hist",
            Self::Filesystem => "fs",
            Self::Apt => "apt",
            Self::Node => "node",
        }
    }

    /// Whether this kind compares package inventories.
    #[must_use]
    pub const fn is_package_kind(self) -> bool {
        matches!(self, Self::Apt | Self::Node)
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiffKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hist" | "history" => Ok(Self::History),
            "dir" | "fs" | "file" | "filesystem" => Ok(Self::Filesystem),
            "apt" => Ok(Self::Apt),
            "node" => Ok(Self::Node),
            other => Err(format!(
                "Unknown differ: {other}. Valid differs: hist, dir, apt, node"
            )),
        }
    }
}
