use std::fmt;

use super::version::upgrade_required;

/// Git state of an editable checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutState {
    /// Branch name, or `DETACHED at <short-revision>`.
    pub branch: String,
    /// Short commit id, with ` (uncommitted changes)` appended for a dirty tree.
    pub revision_descriptor: String,
}

/// Everything the report knows about one package.
///
/// A record has one of two shapes: not installed (only `importable == false`)
/// or installed. The constructors are the only way to build one, so a
/// half-filled record cannot exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageAttributes {
    importable: bool,
    version: Option<String>,
    install_path: Option<String>,
    branch: Option<String>,
    revision_descriptor: Option<String>,
    latest_version: Option<String>,
    upgrade_required: bool,
}

impl PackageAttributes {
    pub fn not_installed() -> Self {
        Self::default()
    }

    pub fn installed(
        version: Option<String>,
        install_path: Option<String>,
        checkout: Option<CheckoutState>,
        latest_version: Option<String>,
    ) -> Self {
        let upgrade_required = upgrade_required(version.as_deref(), latest_version.as_deref());
        let (branch, revision_descriptor) = match checkout {
            Some(state) => (Some(state.branch), Some(state.revision_descriptor)),
            None => (None, None),
        };
        Self {
            importable: true,
            version,
            install_path,
            branch,
            revision_descriptor,
            latest_version,
            upgrade_required,
        }
    }

    pub fn importable(&self) -> bool {
        self.importable
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn install_path(&self) -> Option<&str> {
        self.install_path.as_deref()
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn revision_descriptor(&self) -> Option<&str> {
        self.revision_descriptor.as_deref()
    }

    pub fn latest_version(&self) -> Option<&str> {
        self.latest_version.as_deref()
    }

    pub fn upgrade_required(&self) -> bool {
        self.upgrade_required
    }

    pub fn status(&self) -> PackageStatus {
        if !self.importable {
            PackageStatus::NotInstalled
        } else if self.upgrade_required {
            PackageStatus::UpgradeAvailable
        } else if self.latest_version.is_none() {
            PackageStatus::Unknown
        } else {
            PackageStatus::UpToDate
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::Version => self.version(),
            Attribute::FilePath => self.install_path(),
            Attribute::Branch => self.branch(),
            Attribute::Describe => self.revision_descriptor(),
            Attribute::LatestVersion => self.latest_version(),
        }
    }
}

/// Overall state of a package, used for coloring the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    NotInstalled,
    UpToDate,
    UpgradeAvailable,
    /// Installed, but the latest release could not be determined.
    Unknown,
}

/// Attributes selectable with `get PACKAGE ATTRIBUTE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Attribute {
    #[value(name = "version")]
    Version,
    #[value(name = "file_path")]
    FilePath,
    #[value(name = "branch")]
    Branch,
    #[value(name = "describe")]
    Describe,
    #[value(name = "latest_version")]
    LatestVersion,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Version,
        Attribute::FilePath,
        Attribute::Branch,
        Attribute::Describe,
        Attribute::LatestVersion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Version => "version",
            Attribute::FilePath => "file_path",
            Attribute::Branch => "branch",
            Attribute::Describe => "describe",
            Attribute::LatestVersion => "latest_version",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_installed_shape() {
        let attrs = PackageAttributes::not_installed();
        assert!(!attrs.importable());
        assert!(!attrs.upgrade_required());
        for attribute in Attribute::ALL {
            assert_eq!(attrs.get(attribute), None, "{} should be absent", attribute);
        }
        assert_eq!(attrs.status(), PackageStatus::NotInstalled);
    }

    #[test]
    fn test_installed_upgrade_required() {
        let attrs = PackageAttributes::installed(
            Some("4.7.0".into()),
            Some("~/.local/lib/python3.11/site-packages/esm_master".into()),
            None,
            Some("4.10.0".into()),
        );
        assert!(attrs.importable());
        assert!(attrs.upgrade_required());
        assert_eq!(attrs.status(), PackageStatus::UpgradeAvailable);
        assert_eq!(attrs.branch(), None);
    }

    #[test]
    fn test_installed_up_to_date() {
        let attrs = PackageAttributes::installed(
            Some("4.10.0".into()),
            None,
            None,
            Some("4.10.0".into()),
        );
        assert!(!attrs.upgrade_required());
        assert_eq!(attrs.status(), PackageStatus::UpToDate);
    }

    #[test]
    fn test_installed_without_latest() {
        let attrs = PackageAttributes::installed(Some("1.0.0".into()), None, None, None);
        assert!(!attrs.upgrade_required());
        assert_eq!(attrs.status(), PackageStatus::Unknown);
    }

    #[test]
    fn test_checkout_state_is_exposed() {
        let attrs = PackageAttributes::installed(
            Some("6.0.0".into()),
            Some("~/src/esm_tools/src/esm_tools".into()),
            Some(CheckoutState {
                branch: "release".into(),
                revision_descriptor: "1a2b3c4 (uncommitted changes)".into(),
            }),
            Some("6.0.0".into()),
        );
        assert_eq!(attrs.get(Attribute::Branch), Some("release"));
        assert_eq!(
            attrs.get(Attribute::Describe),
            Some("1a2b3c4 (uncommitted changes)")
        );
        assert_eq!(
            attrs.get(Attribute::FilePath),
            Some("~/src/esm_tools/src/esm_tools")
        );
    }

    #[test]
    fn test_attribute_names() {
        use clap::ValueEnum;
        assert_eq!(
            Attribute::from_str("file_path", false).unwrap(),
            Attribute::FilePath
        );
        assert_eq!(
            Attribute::from_str("describe", false).unwrap(),
            Attribute::Describe
        );
        assert!(Attribute::from_str("file-path", false).is_err());
        assert_eq!(Attribute::LatestVersion.to_string(), "latest_version");
    }
}
