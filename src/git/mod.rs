//! Git checkout queries for editable installs.
//!
//! All operations shell out to `git -C <checkout>` through the [`Runtime`], so
//! the user's own git configuration (credentials, remotes) applies to pulls.

use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::package::CheckoutState;
use crate::runtime::{CommandOutput, CommandSpec, Runtime};

/// Exit status of `git symbolic-ref -q` when HEAD is detached.
const DETACHED_HEAD_STATUS: i32 = 1;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("{0} is not inside a git checkout")]
    NotARepository(PathBuf),

    #[error("could not run git: {0}")]
    Launch(String),

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

/// A git working tree on disk.
pub struct GitCheckout<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
}

impl<'a, R: Runtime> GitCheckout<'a, R> {
    /// Open the checkout containing `path` (which may be a subdirectory).
    #[tracing::instrument(skip(runtime))]
    pub fn discover(runtime: &'a R, path: &Path) -> Result<Self, GitError> {
        let output = run_git(runtime, path, &["rev-parse", "--show-toplevel"])?;
        if !output.success() {
            return Err(GitError::NotARepository(path.to_path_buf()));
        }
        let root = PathBuf::from(output.stdout.trim());
        debug!("Found git checkout at {:?}", root);
        Ok(Self { runtime, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Abbreviated commit id of HEAD.
    pub fn short_revision(&self) -> Result<String, GitError> {
        let output = self.git_checked(&["rev-parse", "--short", "HEAD"])?;
        Ok(output.stdout.trim().to_string())
    }

    /// True if tracked files are modified or untracked files exist.
    pub fn is_dirty(&self) -> Result<bool, GitError> {
        let output = self.git_checked(&["status", "--porcelain"])?;
        Ok(!output.stdout.trim().is_empty())
    }

    /// Current branch, or `None` when HEAD is detached.
    pub fn branch(&self) -> Result<Option<String>, GitError> {
        let args = ["symbolic-ref", "--short", "-q", "HEAD"];
        let output = run_git(self.runtime, &self.root, &args)?;
        match output.status {
            Some(0) => Ok(Some(output.stdout.trim().to_string())),
            Some(DETACHED_HEAD_STATUS) => Ok(None),
            _ => Err(command_failed(&args, &output)),
        }
    }

    /// Branch label and revision descriptor as shown in the report.
    #[tracing::instrument(skip(self))]
    pub fn state(&self) -> Result<CheckoutState, GitError> {
        let revision = self.short_revision()?;
        let revision_descriptor = if self.is_dirty()? {
            format!("{} (uncommitted changes)", revision)
        } else {
            revision.clone()
        };
        let branch = match self.branch()? {
            Some(branch) => branch,
            None => format!("DETACHED at {}", revision),
        };
        Ok(CheckoutState {
            branch,
            revision_descriptor,
        })
    }

    /// `git pull` with output streamed to the terminal.
    #[tracing::instrument(skip(self))]
    pub fn pull(&self) -> Result<(), GitError> {
        let command = git_command(&self.root, &["pull"]).inherit_output();
        let output = self
            .runtime
            .run(&command)
            .map_err(|e| GitError::Launch(format!("{:#}", e)))?;
        if !output.success() {
            return Err(command_failed(&["pull"], &output));
        }
        Ok(())
    }

    fn git_checked(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let output = run_git(self.runtime, &self.root, args)?;
        if !output.success() {
            return Err(command_failed(args, &output));
        }
        Ok(output)
    }
}

fn git_command(dir: &Path, args: &[&str]) -> CommandSpec {
    CommandSpec::new("git")
        .arg("-C")
        .arg(dir.display().to_string())
        .args(args.iter().copied())
}

fn run_git<R: Runtime>(runtime: &R, dir: &Path, args: &[&str]) -> Result<CommandOutput, GitError> {
    runtime
        .run(&git_command(dir, args))
        .map_err(|e| GitError::Launch(format!("{:#}", e)))
}

fn command_failed(args: &[&str], output: &CommandOutput) -> GitError {
    let stderr = output.stderr.trim();
    GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: if stderr.is_empty() {
            format!("exit status {:?}", output.status)
        } else {
            stderr.to_string()
        },
    }
}
