use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::application::{list_packages, remove_paths, removal_candidates};
use crate::provider::Provider;
use crate::python::PythonInterpreter;
use crate::runtime::Runtime;

use super::config::Config;
use super::services::build_provider;

/// Remove user-level installs of the package family after confirmation.
#[tracing::instrument(skip(runtime, config))]
pub async fn clean<R: Runtime>(runtime: R, config: Config, yes: bool) -> Result<()> {
    let provider = build_provider(&config)?;
    let environment = PythonInterpreter::new(&config.python).environment(&runtime)?;
    run_clean(&runtime, &provider, &config, &environment.user_site, yes).await
}

pub(crate) async fn run_clean<R: Runtime, P: Provider>(
    runtime: &R,
    provider: &P,
    config: &Config,
    user_site: &Path,
    yes: bool,
) -> Result<()> {
    let names = list_packages(provider, config.source).await?;
    let candidates = removal_candidates(runtime, user_site, &names);

    if candidates.is_empty() {
        println!("Nothing to remove.");
        return Ok(());
    }

    println!("{}", "The following will be removed:".red().bold());
    println!("Python packages:");
    for path in &candidates.site_entries {
        println!("* {}", path.display());
    }
    println!("Executables:");
    for path in &candidates.executables {
        println!("* {}", path.display());
    }

    if !yes && !runtime.confirm("Do you want to continue?")? {
        println!("Aborted, nothing was removed.");
        return Ok(());
    }

    let report = remove_paths(runtime, &candidates.all(), |path| {
        println!("* Removing {}", path.display())
    });

    if !report.failed.is_empty() {
        for (path, error) in &report.failed {
            eprintln!("{} {}: {:#}", "error:".red().bold(), path.display(), error);
        }
        anyhow::bail!(
            "{} of {} path(s) could not be removed",
            report.failed.len(),
            candidates.len()
        );
    }
    Ok(())
}
