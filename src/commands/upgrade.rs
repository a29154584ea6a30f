use anyhow::Result;
use colored::Colorize;

use crate::application::upgrade::SANCTIONED_BRANCHES;
use crate::application::{
    Context, UpgradeError, UpgradeOutcome, UpgradeSummary, Upgrader, list_packages,
};
use crate::package::{PackageName, UpgradeSpec};
use crate::provider::Provider;
use crate::python::PythonInterpreter;
use crate::runtime::Runtime;

use super::config::Config;
use super::select_package;
use super::services::build_provider;

/// Target that upgrades every installed package.
pub const ALL_TARGET: &str = "all";

/// Upgrade one package (`name`, `name=version`, `name==version`) or all of them.
#[tracing::instrument(skip(runtime, config))]
pub async fn upgrade<R: Runtime>(runtime: R, config: Config, target: &str) -> Result<()> {
    let provider = build_provider(&config)?;
    run_upgrade(&runtime, &provider, &config, target).await
}

pub(crate) async fn run_upgrade<R: Runtime, P: Provider>(
    runtime: &R,
    provider: &P,
    config: &Config,
    target: &str,
) -> Result<()> {
    let names = list_packages(provider, config.source).await?;
    let spec = if target == ALL_TARGET {
        None
    } else {
        let spec: UpgradeSpec = target.parse()?;
        select_package(&names, spec.name.as_str())?;
        Some(spec)
    };

    let ctx = Context::load(
        runtime,
        provider,
        PythonInterpreter::new(&config.python),
        &config.repository_base(),
    )?;
    let upgrader = Upgrader::new(&ctx);
    let summary = match &spec {
        Some(spec) => upgrader.upgrade_one(spec),
        None => upgrader.upgrade_all(&names),
    };

    print_summary(&upgrader, &summary);

    if !summary.is_success() {
        anyhow::bail!(
            "{} of {} package(s) could not be upgraded",
            summary.failures.len(),
            summary.failures.len() + summary.outcomes.len()
        );
    }
    Ok(())
}

fn print_summary<R: Runtime, P: Provider>(upgrader: &Upgrader<'_, '_, R, P>, summary: &UpgradeSummary) {
    for (name, outcome) in &summary.outcomes {
        println!("{}", describe_outcome(name, outcome));
    }

    for (name, error) in &summary.failures {
        eprintln!("{} {}: {}", "error:".red().bold(), name, error);
        for hint in failure_hints(upgrader, error) {
            eprintln!("  {}", hint);
        }
    }
}

pub(crate) fn describe_outcome(name: &PackageName, outcome: &UpgradeOutcome) -> String {
    match outcome {
        UpgradeOutcome::Pulled { checkout } => {
            format!("Pulled new version of {} in {}", name, checkout.display())
        }
        UpgradeOutcome::Installed { version: Some(v) } => format!("Installed {} {}", name, v),
        UpgradeOutcome::Installed { version: None } => format!("Upgraded {}", name),
        UpgradeOutcome::SkippedEditable { location } => {
            let mut message = format!(
                "{} is installed in editable mode, no upgrade performed.",
                name
            );
            if let Some(location) = location {
                message.push_str(&format!(" Consider a git pull in {}", location.display()));
            }
            message.yellow().to_string()
        }
        UpgradeOutcome::SkippedNotInstalled => {
            format!("{} is not installed, nothing to upgrade.", name)
                .yellow()
                .to_string()
        }
    }
}

fn failure_hints<R: Runtime, P: Provider>(
    upgrader: &Upgrader<'_, '_, R, P>,
    error: &UpgradeError,
) -> Vec<String> {
    match error {
        UpgradeError::PackageManagerFailure { package, .. } => upgrader.hints(package),
        UpgradeError::DirtyCheckout { .. } => {
            vec!["Commit or stash your changes, then run the upgrade again.".to_string()]
        }
        UpgradeError::WrongBranch { .. } => vec![format!(
            "Switch to one of {} or pull the checkout yourself.",
            SANCTIONED_BRANCHES.join(", ")
        )],
        UpgradeError::Resolution(e) => vec![e.source.to_string()],
        _ => Vec::new(),
    }
}
