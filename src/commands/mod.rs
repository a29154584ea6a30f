//! CLI layer: one module per subcommand.
//!
//! Each command has a public entry point taking the real runtime and a
//! `run_*` twin generic over the provider, which the tests drive with mocks.

use anyhow::Result;

use crate::package::PackageName;

mod check;
mod clean;
pub mod config;
mod get;
mod render;
pub mod services;
mod upgrade;

pub use check::{CheckOptions, check};
pub use clean::clean;
pub use get::get;
pub use upgrade::{ALL_TARGET, upgrade};

/// Resolve a user supplied package name against the discovered list.
pub(crate) fn select_package(names: &[PackageName], requested: &str) -> Result<PackageName> {
    let name: PackageName = requested.parse()?;
    if names.contains(&name) {
        return Ok(name);
    }
    let known: Vec<&str> = names.iter().map(PackageName::as_str).collect();
    anyhow::bail!(
        "Package {} not found. Known packages: {}",
        requested,
        known.join(", ")
    )
}
