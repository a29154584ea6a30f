//! Package model
//!
//! Names of the tracked packages, upgrade targets, version ordering,
//! editable-install detection and the per-package attribute record.

mod attributes;
mod editable;
mod name;
mod spec;
pub mod version;

pub use attributes::{Attribute, CheckoutState, PackageAttributes, PackageStatus};
pub use editable::EditableDetector;
pub use name::{PACKAGE_PREFIX, PackageName, TRACKED_PACKAGES, UMBRELLA_PACKAGE};
pub use spec::{UpgradeSpec, is_valid_version_spec};
pub use version::{DottedVersion, upgrade_required};
