use anyhow::Result;
use log::debug;

use crate::application::{Context, build_report, list_packages};
use crate::provider::Provider;
use crate::python::PythonInterpreter;
use crate::runtime::Runtime;

use super::config::Config;
use super::render::{render_failures, render_inventory};
use super::select_package;
use super::services::build_provider;

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Report on this package only.
    pub package: Option<String>,
    pub no_color: bool,
}

/// Print the inventory of installed packages.
#[tracing::instrument(skip(runtime, config))]
pub async fn check<R: Runtime>(runtime: R, config: Config, options: CheckOptions) -> Result<()> {
    if options.no_color {
        colored::control::set_override(false);
    }
    let provider = build_provider(&config)?;
    let output = run_check(&runtime, &provider, &config, &options).await?;
    print!("{}", output);
    Ok(())
}

pub(crate) async fn run_check<R: Runtime, P: Provider>(
    runtime: &R,
    provider: &P,
    config: &Config,
    options: &CheckOptions,
) -> Result<String> {
    let mut names = list_packages(provider, config.source).await?;
    if let Some(requested) = &options.package {
        names = vec![select_package(&names, requested)?];
    }
    debug!("Checking {} packages", names.len());

    let ctx = Context::load(
        runtime,
        provider,
        PythonInterpreter::new(&config.python),
        &config.repository_base(),
    )?;
    let report = build_report(&ctx, &names).await;

    for line in render_failures(&report.failures) {
        eprintln!("Could not inspect {}", line);
    }

    let mut output = String::from("You are using the following esm_tools versions:\n\n");
    output.push_str(&render_inventory(
        &report.inventory,
        runtime.terminal_width(),
    ));
    Ok(output)
}
