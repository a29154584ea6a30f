//! Package discovery and attribute resolution.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::git::GitCheckout;
use crate::package::{CheckoutState, PackageAttributes, PackageName};
use crate::provider::Provider;
use crate::python::{ModuleProbe, ProbeError};
use crate::runtime::{Runtime, collapse_home};

use super::Context;

/// Where the list of package names comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageSource {
    /// The fixed list compiled into the tool.
    Tracked,
    /// The organization's repositories on the code host.
    Remote,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("could not list the packages of {organization}: {reason:#}")]
    RemoteUnavailable {
        organization: String,
        reason: anyhow::Error,
    },
}

/// A package was found but could not be inspected.
#[derive(Debug, Error)]
#[error("could not resolve the attributes of {package}")]
pub struct AttributeResolutionError {
    pub package: PackageName,
    #[source]
    pub source: ProbeError,
}

/// Resolved records keyed by package name, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    entries: Vec<(PackageName, PackageAttributes)>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the record of `name`, keeping its original position.
    pub fn insert(&mut self, name: PackageName, attributes: PackageAttributes) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = attributes,
            None => self.entries.push((name, attributes)),
        }
    }

    pub fn get(&self, name: &PackageName) -> Option<&PackageAttributes> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, attributes)| attributes)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &PackageAttributes)> {
        self.entries.iter().map(|(n, a)| (n, a))
    }

    /// Names of the packages that could be imported.
    pub fn importable(&self) -> Vec<PackageName> {
        self.iter()
            .filter(|(_, a)| a.importable())
            .map(|(n, _)| n.clone())
            .collect()
    }
}

/// Result of inspecting a list of packages.
#[derive(Debug, Default)]
pub struct Report {
    pub inventory: Inventory,
    /// Packages left out of the inventory because inspecting them failed.
    pub failures: Vec<AttributeResolutionError>,
}

/// Names of the packages to report on.
///
/// Remote discovery takes every repository of the organization, in listing
/// order. Failures are fatal: there is nothing to report on.
#[tracing::instrument(skip(provider))]
pub async fn list_packages<P: Provider>(
    provider: &P,
    source: PackageSource,
) -> Result<Vec<PackageName>, DiscoveryError> {
    match source {
        PackageSource::Tracked => Ok(PackageName::tracked()),
        PackageSource::Remote => {
            let repositories = provider.list_repositories().await.map_err(|reason| {
                DiscoveryError::RemoteUnavailable {
                    organization: provider.organization(),
                    reason,
                }
            })?;
            let names: Vec<PackageName> = repositories
                .into_iter()
                .map(PackageName::new)
                .collect();
            debug!("Discovered {} packages", names.len());
            Ok(names)
        }
    }
}

/// Import `name` and report where it lives, or `None` if it is not importable.
///
/// Namespace packages have no `__file__` and therefore no directory.
pub fn locate_module<R: Runtime, P: Provider>(
    ctx: &Context<'_, R, P>,
    name: &PackageName,
) -> Result<Option<ModuleLocation>, AttributeResolutionError> {
    let probe = ctx
        .python
        .probe_module(ctx.runtime, name)
        .map_err(|source| AttributeResolutionError {
            package: name.clone(),
            source,
        })?;

    match probe {
        ModuleProbe::NotFound => Ok(None),
        ModuleProbe::Found { version, file } => Ok(Some(ModuleLocation {
            version,
            directory: file.as_deref().and_then(Path::parent).map(Path::to_path_buf),
        })),
    }
}

/// Where an importable module was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocation {
    pub version: Option<String>,
    pub directory: Option<PathBuf>,
}

/// Build the attribute record of one package.
///
/// Only the import itself can fail. Git and release lookups degrade to
/// absent fields with a warning.
#[tracing::instrument(skip(ctx))]
pub async fn resolve_attributes<R: Runtime, P: Provider>(
    ctx: &Context<'_, R, P>,
    name: &PackageName,
) -> Result<PackageAttributes, AttributeResolutionError> {
    let Some(location) = locate_module(ctx, name)? else {
        return Ok(PackageAttributes::not_installed());
    };

    let install_path = location
        .directory
        .as_deref()
        .map(|dir| collapse_home(dir, ctx.home.as_deref()));
    let checkout = checkout_state(ctx, name);
    let latest_version = latest_version(ctx, name).await;

    Ok(PackageAttributes::installed(
        location.version,
        install_path,
        checkout,
        latest_version,
    ))
}

/// Resolve every package, collecting failures instead of stopping.
pub async fn build_report<R: Runtime, P: Provider>(
    ctx: &Context<'_, R, P>,
    names: &[PackageName],
) -> Report {
    let mut report = Report::default();
    for name in names {
        match resolve_attributes(ctx, name).await {
            Ok(attributes) => report.inventory.insert(name.clone(), attributes),
            Err(e) => {
                warn!("{}: {}", e, e.source);
                report.failures.push(e);
            }
        }
    }
    report
}

/// The packages that import cleanly and where they live, without contacting
/// the code host.
pub fn importable_packages<R: Runtime, P: Provider>(
    ctx: &Context<'_, R, P>,
    names: &[PackageName],
) -> (Vec<(PackageName, ModuleLocation)>, Vec<AttributeResolutionError>) {
    let mut importable = Vec::new();
    let mut failures = Vec::new();
    for name in names {
        match locate_module(ctx, name) {
            Ok(Some(location)) => importable.push((name.clone(), location)),
            Ok(None) => debug!("{} is not installed", name),
            Err(e) => failures.push(e),
        }
    }
    (importable, failures)
}

fn checkout_state<R: Runtime, P: Provider>(
    ctx: &Context<'_, R, P>,
    name: &PackageName,
) -> Option<CheckoutState> {
    let location = ctx.editable_detector().editable_location(name)?;
    let state = GitCheckout::discover(ctx.runtime, &location).and_then(|checkout| checkout.state());
    match state {
        Ok(state) => Some(state),
        Err(e) => {
            warn!("Could not read the git state of {} at {:?}: {}", name, location, e);
            None
        }
    }
}

async fn latest_version<R: Runtime, P: Provider>(
    ctx: &Context<'_, R, P>,
    name: &PackageName,
) -> Option<String> {
    match ctx.provider.latest_version(name).await {
        Ok(version) => Some(version),
        Err(e) => {
            warn!("Could not determine the latest version of {}: {:#}", name, e);
            None
        }
    }
}
