use anyhow::Result;
use log::warn;

use crate::application::{Context, list_packages, resolve_attributes};
use crate::package::Attribute;
use crate::provider::Provider;
use crate::python::PythonInterpreter;
use crate::runtime::Runtime;

use super::config::Config;
use super::render::render_attributes;
use super::select_package;
use super::services::build_provider;

/// Print one attribute of a package, or all of them.
#[tracing::instrument(skip(runtime, config))]
pub async fn get<R: Runtime>(
    runtime: R,
    config: Config,
    package: &str,
    attribute: Option<Attribute>,
) -> Result<()> {
    let provider = build_provider(&config)?;
    let output = run_get(&runtime, &provider, &config, package, attribute).await?;
    println!("{}", output);
    Ok(())
}

pub(crate) async fn run_get<R: Runtime, P: Provider>(
    runtime: &R,
    provider: &P,
    config: &Config,
    package: &str,
    attribute: Option<Attribute>,
) -> Result<String> {
    let names = list_packages(provider, config.source).await?;
    let name = select_package(&names, package)?;

    let ctx = Context::load(
        runtime,
        provider,
        PythonInterpreter::new(&config.python),
        &config.repository_base(),
    )?;
    let attributes = resolve_attributes(&ctx, &name).await?;
    if !attributes.importable() {
        warn!("{} is not installed", name);
    }

    Ok(render_attributes(&attributes, attribute))
}
