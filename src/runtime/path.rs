//! Path helpers that work purely on strings and components.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Placeholder that stands for the user's home directory in reports.
pub const HOME_PLACEHOLDER: &str = "~";

/// Replace a leading `home` component prefix of `path` with `~`.
///
/// Matching is done on whole components, so `/home/user2` is not collapsed
/// for home `/home/user`. Paths outside the home directory are returned as-is.
pub fn collapse_home(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home
        && !home.as_os_str().is_empty()
        && let Ok(rest) = path.strip_prefix(home)
    {
        if rest.as_os_str().is_empty() {
            return HOME_PLACEHOLDER.to_string();
        }
        return Path::new(HOME_PLACEHOLDER).join(rest).display().to_string();
    }
    path.display().to_string()
}

/// Split a `PATH`-style variable into its directories, dropping empty entries.
pub fn split_search_path(value: &str) -> Vec<PathBuf> {
    std::env::split_paths(OsStr::new(value))
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}
