//! Upgrade dispatcher: `git pull` for the umbrella checkout, pip for the rest.

use std::path::PathBuf;

use log::{debug, info};
use thiserror::Error;

use crate::git::{GitCheckout, GitError};
use crate::package::{PackageName, UpgradeSpec};
use crate::provider::Provider;
use crate::runtime::Runtime;

use super::Context;
use super::inventory::{
    AttributeResolutionError, ModuleLocation, importable_packages, locate_module,
};

/// Branches the umbrella checkout may be pulled on.
pub const SANCTIONED_BRANCHES: &[&str] = &["release", "develop"];

/// What happened to one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// The umbrella checkout was pulled.
    Pulled { checkout: PathBuf },
    /// pip installed the package (at `version`, or the newest commit).
    Installed { version: Option<String> },
    /// Editable install left alone; the user should update the checkout.
    SkippedEditable { location: Option<PathBuf> },
    /// Nothing to upgrade: the package cannot be imported.
    SkippedNotInstalled,
}

#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("the checkout at {} has uncommitted changes", .checkout.display())]
    DirtyCheckout { checkout: PathBuf },

    #[error("the checkout at {} is on {branch}; only release or develop are pulled", .checkout.display())]
    WrongBranch { checkout: PathBuf, branch: String },

    #[error("cannot locate the checkout of {0}")]
    CheckoutNotFound(PackageName),

    #[error("pip failed to install {package} (exit status {status:?})")]
    PackageManagerFailure {
        package: PackageName,
        status: Option<i32>,
    },

    #[error("could not run pip: {0}")]
    Launch(String),

    #[error(transparent)]
    Resolution(#[from] AttributeResolutionError),

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Outcomes and failures of an upgrade run, in processing order.
#[derive(Debug, Default)]
pub struct UpgradeSummary {
    pub outcomes: Vec<(PackageName, UpgradeOutcome)>,
    pub failures: Vec<(PackageName, UpgradeError)>,
}

impl UpgradeSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, name: PackageName, result: Result<UpgradeOutcome, UpgradeError>) {
        match result {
            Ok(outcome) => self.outcomes.push((name, outcome)),
            Err(e) => {
                debug!("Upgrade of {} failed: {}", name, e);
                self.failures.push((name, e));
            }
        }
    }
}

pub struct Upgrader<'c, 'a, R: Runtime, P: Provider> {
    ctx: &'c Context<'a, R, P>,
}

impl<'c, 'a, R: Runtime, P: Provider> Upgrader<'c, 'a, R, P> {
    pub fn new(ctx: &'c Context<'a, R, P>) -> Self {
        Self { ctx }
    }

    /// Upgrade a single package.
    #[tracing::instrument(skip(self))]
    pub fn upgrade(&self, spec: &UpgradeSpec) -> Result<UpgradeOutcome, UpgradeError> {
        let Some(location) = locate_module(self.ctx, &spec.name)? else {
            info!("{} is not installed, skipping", spec.name);
            return Ok(UpgradeOutcome::SkippedNotInstalled);
        };
        self.upgrade_installed(spec, location)
    }

    fn upgrade_installed(
        &self,
        spec: &UpgradeSpec,
        location: ModuleLocation,
    ) -> Result<UpgradeOutcome, UpgradeError> {
        if spec.name.is_umbrella() {
            let directory = location
                .directory
                .ok_or_else(|| UpgradeError::CheckoutNotFound(spec.name.clone()))?;
            return self.pull_umbrella(&directory);
        }

        let detector = self.ctx.editable_detector();
        if detector.is_editable(&spec.name) {
            let location = detector.editable_location(&spec.name);
            info!("{} is installed in editable mode, skipping", spec.name);
            return Ok(UpgradeOutcome::SkippedEditable { location });
        }

        self.pip_install(spec)
    }

    /// Upgrade every importable package to its newest version.
    ///
    /// A failing package never stops the others.
    pub fn upgrade_all(&self, names: &[PackageName]) -> UpgradeSummary {
        let mut summary = UpgradeSummary::default();
        let (importable, failures) = importable_packages(self.ctx, names);
        for failure in failures {
            summary.record(failure.package.clone(), Err(failure.into()));
        }
        for (name, location) in importable {
            let spec = UpgradeSpec::latest(name.clone());
            summary.record(name, self.upgrade_installed(&spec, location));
        }
        summary
    }

    /// Upgrade one target, collecting the result like [`Self::upgrade_all`].
    pub fn upgrade_one(&self, spec: &UpgradeSpec) -> UpgradeSummary {
        let mut summary = UpgradeSummary::default();
        summary.record(spec.name.clone(), self.upgrade(spec));
        summary
    }

    /// Remediation hints printed after a failed pip run.
    pub fn hints(&self, package: &PackageName) -> Vec<String> {
        let url = self.ctx.repository_url(package);
        vec![
            "You may have asked for a branch that does not exist.".to_string(),
            format!("  Valid branches are listed at {}/branches", url),
            "You may have given an invalid version number.".to_string(),
            format!("  Valid versions are listed at {}/releases", url),
        ]
    }

    fn pull_umbrella(&self, directory: &std::path::Path) -> Result<UpgradeOutcome, UpgradeError> {
        let checkout = GitCheckout::discover(self.ctx.runtime, directory)?;
        let root = checkout.root().to_path_buf();

        if checkout.is_dirty()? {
            return Err(UpgradeError::DirtyCheckout { checkout: root });
        }

        let branch = checkout.branch()?;
        match branch.as_deref() {
            Some(b) if SANCTIONED_BRANCHES.contains(&b) => {}
            other => {
                return Err(UpgradeError::WrongBranch {
                    checkout: root,
                    branch: other.unwrap_or("a detached HEAD").to_string(),
                });
            }
        }

        info!("Pulling {}", root.display());
        checkout.pull()?;
        Ok(UpgradeOutcome::Pulled { checkout: root })
    }

    fn pip_install(&self, spec: &UpgradeSpec) -> Result<UpgradeOutcome, UpgradeError> {
        let mut target = format!("git+{}", self.ctx.repository_url(&spec.name));
        if let Some(version) = &spec.version {
            target.push('@');
            target.push_str(version);
        }

        let mut args = vec!["install".to_string()];
        if self.ctx.user_install() {
            args.push("--user".to_string());
        }
        args.push("--upgrade".to_string());
        args.push(target);

        let command = self
            .ctx
            .python
            .module_command("pip", args)
            .inherit_output();
        debug!("Running `{}`", command);

        let output = self
            .ctx
            .runtime
            .run(&command)
            .map_err(|e| UpgradeError::Launch(format!("{:#}", e)))?;
        if !output.success() {
            return Err(UpgradeError::PackageManagerFailure {
                package: spec.name.clone(),
                status: output.status,
            });
        }

        Ok(UpgradeOutcome::Installed {
            version: spec.version.clone(),
        })
    }
}
