//! Environment and system information operations.

use std::env;
use std::path::PathBuf;

use terminal_size::Width;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn home_dir_impl(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    /// `COLUMNS` takes precedence over the size of the tty on stdout.
    #[tracing::instrument(skip(self))]
    pub(crate) fn terminal_width_impl(&self) -> Option<usize> {
        resolve_width(env::var("COLUMNS").ok().as_deref(), || {
            terminal_size::terminal_size_of(std::io::stdout()).map(|(Width(w), _)| w as usize)
        })
    }
}

fn resolve_width(columns: Option<&str>, tty_width: impl FnOnce() -> Option<usize>) -> Option<usize> {
    columns
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|c| *c > 0)
        .or_else(tty_width)
        .filter(|w| *w > 0)
}
