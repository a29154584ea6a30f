//! Upstream release information.
//!
//! The inventory needs two things from the code host: the names of the
//! organization's repositories and the newest release of each package. Both
//! sit behind the [`Provider`] trait so the resolver never sees HTTP.

mod github;

use anyhow::Result;
use async_trait::async_trait;

use crate::package::PackageName;

pub use github::GitHubProvider;

/// Default code host API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Organization that publishes the tracked packages.
pub const DEFAULT_ORGANIZATION: &str = "esm-tools";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Organization the packages are published under.
    fn organization(&self) -> String;

    /// Newest published version of `package`, without any `v` prefix.
    async fn latest_version(&self, package: &PackageName) -> Result<String>;

    /// Names of all repositories of the organization, in listing order.
    async fn list_repositories(&self) -> Result<Vec<String>>;
}
