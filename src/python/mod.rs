//! Bridge to the Python interpreter the tracked packages are installed into.
//!
//! Imports are done by the interpreter itself (`python -c ...`), so the
//! answers match exactly what a user's `import esm_master` would see,
//! including `.pth` files, user site and virtual environments.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::package::PackageName;
use crate::runtime::{CommandSpec, Runtime};

/// Exit status the probe script uses for "module not found".
const MODULE_NOT_FOUND_STATUS: i32 = 3;

const ENVIRONMENT_SCRIPT: &str = r#"import json, site, sys
print(json.dumps({"sys_path": sys.path, "user_site": site.getusersitepackages(), "executable": sys.executable}))
"#;

const PROBE_SCRIPT: &str = r#"import importlib, json, sys
name = sys.argv[1]
try:
    module = importlib.import_module(name)
except ModuleNotFoundError as error:
    if error.name is not None and (name == error.name or name.startswith(error.name + ".")):
        sys.exit(3)
    raise
version = getattr(module, "__version__", None)
if version is None:
    try:
        from importlib.metadata import version as distribution_version
        version = distribution_version(name)
    except Exception:
        version = None
print(json.dumps({"version": None if version is None else str(version), "file": getattr(module, "__file__", None)}))
"#;

/// Search path and site layout of the interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PythonEnvironment {
    /// `sys.path`, in lookup order.
    pub sys_path: Vec<PathBuf>,
    /// `site.getusersitepackages()`.
    pub user_site: PathBuf,
    /// `sys.executable`.
    pub executable: PathBuf,
}

/// What importing a module told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleProbe {
    NotFound,
    Found {
        version: Option<String>,
        /// The module's `__file__` (absent for namespace packages).
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    version: Option<String>,
    file: Option<PathBuf>,
}

/// Failures other than "module not found".
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("could not start the Python interpreter: {0}")]
    Launch(String),

    #[error("import raised an exception: {0}")]
    ImportFailed(String),

    #[error("interpreter produced unexpected output: {0}")]
    InvalidOutput(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonInterpreter {
    program: String,
}

impl PythonInterpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// `<python> -m <module> args...`
    pub fn module_command<I, S>(&self, module: &str, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(&self.program)
            .arg("-m")
            .arg(module)
            .args(args)
    }

    fn script_command(&self, script: &str) -> CommandSpec {
        CommandSpec::new(&self.program).arg("-c").arg(script)
    }

    /// Ask the interpreter for its module search path and user site directory.
    #[tracing::instrument(skip(self, runtime))]
    pub fn environment<R: Runtime>(&self, runtime: &R) -> Result<PythonEnvironment> {
        let output = runtime
            .run(&self.script_command(ENVIRONMENT_SCRIPT))
            .with_context(|| format!("Failed to run Python interpreter `{}`", self.program))?;

        if !output.success() {
            anyhow::bail!(
                "Python interpreter `{}` failed: {}",
                self.program,
                last_line(&output.stderr)
            );
        }

        let environment: PythonEnvironment = serde_json::from_str(&last_line(&output.stdout))
            .context("Failed to parse Python environment description")?;
        debug!(
            "Python {:?}: {} search path entries, user site {:?}",
            environment.executable,
            environment.sys_path.len(),
            environment.user_site
        );
        Ok(environment)
    }

    /// Import `name` in a fresh interpreter and report its version and file.
    #[tracing::instrument(skip(self, runtime))]
    pub fn probe_module<R: Runtime>(
        &self,
        runtime: &R,
        name: &PackageName,
    ) -> Result<ModuleProbe, ProbeError> {
        let command = self.script_command(PROBE_SCRIPT).arg(name.as_str());
        let output = runtime
            .run(&command)
            .map_err(|e| ProbeError::Launch(format!("{}: {:#}", self.program, e)))?;

        match output.status {
            Some(0) => {
                // Packages may print on import; the report is the final line.
                let report: ProbeReport = serde_json::from_str(&last_line(&output.stdout))
                    .map_err(|e| ProbeError::InvalidOutput(e.to_string()))?;
                Ok(ModuleProbe::Found {
                    version: report.version,
                    file: report.file,
                })
            }
            Some(MODULE_NOT_FOUND_STATUS) => {
                debug!("{} is not importable", name);
                Ok(ModuleProbe::NotFound)
            }
            _ => Err(ProbeError::ImportFailed(last_line(&output.stderr))),
        }
    }
}

/// Last non-empty line of some output: the JSON report on stdout, or the
/// exception message of a traceback on stderr.
fn last_line(text: &str) -> String {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no output")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{CommandOutput, MockRuntime};
    use mockall::predicate::function;

    fn python() -> PythonInterpreter {
        PythonInterpreter::new("python3")
    }

    #[test]
    fn test_environment_parses_interpreter_report() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .with(function(|c: &CommandSpec| {
                c.program == "python3" && c.args[0] == "-c" && c.args.len() == 2
            }))
            .returning(|_| {
                Ok(CommandOutput::ok(
                    r#"{"sys_path": ["", "/usr/lib/python3.11", "/home/user/.local/lib/python3.11/site-packages"], "user_site": "/home/user/.local/lib/python3.11/site-packages", "executable": "/usr/bin/python3"}"#,
                ))
            });

        let env = python().environment(&runtime).unwrap();
        assert_eq!(env.sys_path.len(), 3);
        assert_eq!(env.sys_path[1], PathBuf::from("/usr/lib/python3.11"));
        assert_eq!(
            env.user_site,
            PathBuf::from("/home/user/.local/lib/python3.11/site-packages")
        );
        assert_eq!(env.executable, PathBuf::from("/usr/bin/python3"));
    }

    #[test]
    fn test_environment_interpreter_failure() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .returning(|_| Ok(CommandOutput::failed(1, "boom\n")));

        let err = python().environment(&runtime).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_probe_found() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .with(function(|c: &CommandSpec| c.args.last().map(String::as_str) == Some("esm_parser")))
            .returning(|_| {
                Ok(CommandOutput::ok(
                    r#"{"version": "6.21.0", "file": "/home/user/.local/lib/python3.11/site-packages/esm_parser/__init__.py"}"#,
                ))
            });

        let probe = python()
            .probe_module(&runtime, &PackageName::new("esm_parser"))
            .unwrap();
        assert_eq!(
            probe,
            ModuleProbe::Found {
                version: Some("6.21.0".into()),
                file: Some(PathBuf::from(
                    "/home/user/.local/lib/python3.11/site-packages/esm_parser/__init__.py"
                )),
            }
        );
    }

    #[test]
    fn test_probe_found_without_version() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .returning(|_| Ok(CommandOutput::ok(r#"{"version": null, "file": null}"#)));

        let probe = python()
            .probe_module(&runtime, &PackageName::new("esm_autotests"))
            .unwrap();
        assert_eq!(
            probe,
            ModuleProbe::Found {
                version: None,
                file: None
            }
        );
    }

    #[test]
    fn test_probe_not_found() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .returning(|_| Ok(CommandOutput::failed(MODULE_NOT_FOUND_STATUS, "")));

        let probe = python()
            .probe_module(&runtime, &PackageName::new("esm_database"))
            .unwrap();
        assert_eq!(probe, ModuleProbe::NotFound);
    }

    #[test]
    fn test_probe_import_exception() {
        let mut runtime = MockRuntime::new();
        runtime.expect_run().returning(|_| {
            Ok(CommandOutput::failed(
                1,
                "Traceback (most recent call last):\n  File \"<string>\", line 4\nModuleNotFoundError: No module named 'yaml'\n",
            ))
        });

        let err = python()
            .probe_module(&runtime, &PackageName::new("esm_parser"))
            .unwrap_err();
        assert!(matches!(err, ProbeError::ImportFailed(ref m) if m.contains("yaml")));
    }

    #[test]
    fn test_probe_launch_failure() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .returning(|_| Err(anyhow::anyhow!("No such file or directory")));

        let err = python()
            .probe_module(&runtime, &PackageName::new("esm_parser"))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Launch(_)));
    }

    #[test]
    fn test_probe_garbled_output() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .returning(|_| Ok(CommandOutput::ok("hello from sitecustomize")));

        let err = python()
            .probe_module(&runtime, &PackageName::new("esm_parser"))
            .unwrap_err();
        assert!(matches!(err, ProbeError::InvalidOutput(_)));
    }

    #[test]
    fn test_module_command() {
        let command = python().module_command("pip", ["install", "--upgrade"]);
        assert_eq!(command.to_string(), "python3 -m pip install --upgrade");
    }

    #[test]
    fn test_last_line() {
        assert_eq!(last_line("a\nb\n\n"), "b");
        assert_eq!(last_line(""), "no output");
    }
}
