use std::fmt;
use std::str::FromStr;

use anyhow::Result;

/// Packages reported when remote discovery is not requested, in report order.
pub const TRACKED_PACKAGES: &[&str] = &[
    "esm_archiving",
    "esm_autotests",
    "esm_calendar",
    "esm_database",
    "esm_environment",
    "esm_master",
    "esm_parser",
    "esm_profile",
    "esm_rcfile",
    "esm_runscripts",
    "esm_tools",
    "esm_plugin_manager",
    "esm_version_checker",
];

/// Common prefix of every package (and installed script) of the family.
pub const PACKAGE_PREFIX: &str = "esm_";

/// The aggregating package whose upgrade path is a `git pull`.
pub const UMBRELLA_PACKAGE: &str = "esm_tools";

/// Command name of this tool, accepted wherever its package name is expected.
const SELF_ALIAS: &str = "esm_versions";
const SELF_PACKAGE: &str = "esm_version_checker";

/// An importable package name in its underscore form (`esm_master`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageName(String);

impl PackageName {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == SELF_ALIAS {
            return Self(SELF_PACKAGE.to_string());
        }
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hyphenated distribution name (`esm-master`), as used by pip metadata.
    pub fn distribution_name(&self) -> String {
        self.0.replace('_', "-")
    }

    pub fn is_umbrella(&self) -> bool {
        self.0 == UMBRELLA_PACKAGE
    }

    /// The fixed package list, in report order.
    pub fn tracked() -> Vec<PackageName> {
        TRACKED_PACKAGES.iter().map(|n| PackageName::new(*n)).collect()
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PackageName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            anyhow::bail!("Package name cannot be empty.");
        }
        if s.contains(char::is_whitespace) || s.contains('/') {
            anyhow::bail!("Invalid package name '{}'.", s);
        }
        Ok(PackageName::new(s))
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
