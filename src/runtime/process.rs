//! Child process execution.

use anyhow::{Context, Result};
use log::debug;
use std::fmt;
use std::process::{Command, Stdio};

use super::RealRuntime;

/// A command line to run.
///
/// Output is captured by default; `inherit_output` streams it straight to the
/// user's terminal instead (used for long-running `pip` and `git pull`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub inherit_output: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            inherit_output: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn inherit_output(mut self) -> Self {
        self.inherit_output = true;
        self
    }

    /// True if the argument list contains `arg` verbatim.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of a finished command. `status` is `None` when the process was
/// killed by a signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    #[cfg(test)]
    pub(crate) fn ok(stdout: &str) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn failed(status: i32, stderr: &str) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_impl(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!("Running `{}`", spec);

        let mut command = Command::new(&spec.program);
        command.args(&spec.args);

        if spec.inherit_output {
            let status = command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .with_context(|| format!("Failed to run `{}`", spec.program))?;
            return Ok(CommandOutput {
                status: status.code(),
                ..Default::default()
            });
        }

        let output = command
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run `{}`", spec.program))?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    #[test]
    fn test_command_spec_builder_and_display() {
        let spec = CommandSpec::new("git")
            .arg("-C")
            .arg("/src/esm_tools")
            .args(["status", "--porcelain"]);

        assert_eq!(spec.to_string(), "git -C /src/esm_tools status --porcelain");
        assert!(spec.has_arg("--porcelain"));
        assert!(!spec.has_arg("pull"));
        assert!(!spec.inherit_output);
    }

    #[cfg(unix)]
    #[test]
    fn test_real_runtime_run_captures_output() {
        let runtime = RealRuntime;
        let output = runtime
            .run(&CommandSpec::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .unwrap();

        assert_eq!(output.status, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn test_real_runtime_missing_program_is_error() {
        let runtime = RealRuntime;
        let result = runtime.run(&CommandSpec::new("esm-versions-no-such-program-xyz"));
        assert!(result.is_err());
    }
}
