//! Upgrade target parsing.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use super::PackageName;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?\d+(\.\d+)*$").expect("version pattern is a valid regex")
});

/// A package to upgrade plus an optional pinned version.
///
/// Format: `name`, `name=version` or `name==version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeSpec {
    pub name: PackageName,
    pub version: Option<String>,
}

impl UpgradeSpec {
    pub fn latest(name: PackageName) -> Self {
        Self {
            name,
            version: None,
        }
    }
}

/// True if `version` looks like a release number (`4.10.2`, `v4.10.2`).
pub fn is_valid_version_spec(version: &str) -> bool {
    VERSION_PATTERN.is_match(version)
}

impl fmt::Display for UpgradeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}=={}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for UpgradeSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name_part, version_part) = match s.split_once("==") {
            Some((name, version)) => (name, Some(version)),
            None => match s.split_once('=') {
                Some((name, version)) => (name, Some(version)),
                None => (s, None),
            },
        };

        let name = name_part.parse::<PackageName>()?;

        let version_part = version_part.map(str::trim).filter(|v| !v.is_empty());
        let version = match version_part {
            Some(v) if is_valid_version_spec(v) => Some(v.to_string()),
            Some(v) => {
                warn!(
                    "Ignoring invalid version '{}' for {}: expected a version like 4.10.2. Upgrading to the latest version instead.",
                    v, name
                );
                None
            }
            None => None,
        };

        Ok(UpgradeSpec { name, version })
    }
}
