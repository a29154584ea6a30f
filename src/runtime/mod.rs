//! Runtime abstraction for system operations.
//!
//! Everything that touches the outside world (environment, file system,
//! child processes, the terminal) goes through the [`Runtime`] trait so the
//! inventory and upgrade logic can be exercised against a mock.
//!
//! # Structure
//!
//! - `path` - Path helpers (home collapsing, search path splitting)
//! - `env` - Environment variables, home directory and terminal size
//! - `fs` - File system operations (read, list, remove, ownership)
//! - `process` - Child process execution
//! - `user` - User interaction (confirmation prompts)

mod env;
mod fs;
pub mod path;
mod process;
mod user;

use anyhow::Result;
use std::env as std_env;
use std::path::{Path, PathBuf};

pub use path::collapse_home;
pub use process::{CommandOutput, CommandSpec};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;
    fn home_dir(&self) -> Option<PathBuf>;

    /// Width of the attached terminal in columns, if it can be determined.
    fn terminal_width(&self) -> Option<usize>;

    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// True if the file at `path` belongs to the user running this process.
    /// Unreadable paths are reported as not owned.
    fn is_owned_by_current_user(&self, path: &Path) -> bool;

    // Processes
    /// Run a command to completion. A command that starts but exits non-zero
    /// is still `Ok`; only a failure to launch it is an error.
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;

    // User interaction
    /// Prompt user for confirmation. Returns true if user confirms (y/yes), false otherwise.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir_impl()
    }

    fn terminal_width(&self) -> Option<usize> {
        self.terminal_width_impl()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_file_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }

    fn is_owned_by_current_user(&self, path: &Path) -> bool {
        self.is_owned_by_current_user_impl(path)
    }

    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.run_impl(command)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.confirm_impl(prompt)
    }
}
