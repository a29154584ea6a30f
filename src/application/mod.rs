//! Application layer - Use cases that coordinate the package model, the
//! Python bridge, git and the release provider.
//!
//! This layer contains the business rules of the tool and is driven by the
//! CLI layer in `commands`.

pub mod clean;
mod context;
pub mod inventory;
pub mod upgrade;

pub use clean::{RemovalCandidates, RemovalReport, remove_paths, removal_candidates};
pub use context::Context;
pub use inventory::{
    AttributeResolutionError, DiscoveryError, Inventory, PackageSource, Report, build_report,
    list_packages, resolve_attributes,
};
pub use upgrade::{UpgradeError, UpgradeOutcome, UpgradeSummary, Upgrader};

#[cfg(test)]
pub(crate) use context::test_support;
