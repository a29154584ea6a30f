//! Shared state for one run against one Python interpreter.

use std::path::PathBuf;

use anyhow::Result;

use crate::package::{EditableDetector, PackageName};
use crate::provider::Provider;
use crate::python::{PythonEnvironment, PythonInterpreter};
use crate::runtime::Runtime;

/// Everything the inventory, upgrade and cleanup use cases need to look at
/// the user's installation.
pub struct Context<'a, R: Runtime, P: Provider> {
    pub runtime: &'a R,
    pub provider: &'a P,
    pub python: PythonInterpreter,
    pub environment: PythonEnvironment,
    pub home: Option<PathBuf>,
    /// Base URL the package repositories live under (`https://github.com/<org>`).
    repository_base: String,
}

impl<'a, R: Runtime, P: Provider> Context<'a, R, P> {
    pub fn new(
        runtime: &'a R,
        provider: &'a P,
        python: PythonInterpreter,
        environment: PythonEnvironment,
        repository_base: &str,
    ) -> Self {
        Self {
            runtime,
            provider,
            python,
            environment,
            home: runtime.home_dir(),
            repository_base: repository_base.trim_end_matches('/').to_string(),
        }
    }

    /// Query the interpreter for its environment and build the context.
    pub fn load(
        runtime: &'a R,
        provider: &'a P,
        python: PythonInterpreter,
        repository_base: &str,
    ) -> Result<Self> {
        let environment = python.environment(runtime)?;
        Ok(Self::new(
            runtime,
            provider,
            python,
            environment,
            repository_base,
        ))
    }

    pub fn editable_detector(&self) -> EditableDetector<'_, R> {
        EditableDetector::new(self.runtime, &self.environment.sys_path)
    }

    /// Web page of a package's repository.
    pub fn repository_url(&self, package: &PackageName) -> String {
        format!("{}/{}", self.repository_base, package)
    }

    /// True when pip should install into the user site (no virtualenv active).
    pub fn user_install(&self) -> bool {
        self.runtime.env_var("VIRTUAL_ENV").is_err()
    }
}
