use log::debug;

use crate::application::PackageSource;
use crate::provider::{DEFAULT_API_URL, DEFAULT_ORGANIZATION};
use crate::runtime::Runtime;

/// Interpreter used when neither `--python` nor `ESM_VERSIONS_PYTHON` is given.
pub const DEFAULT_PYTHON: &str = "python3";

/// Web host the package repositories are cloned from by pip.
pub const REPOSITORY_HOST: &str = "https://github.com";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub python: String,
    pub api_url: String,
    pub organization: String,
    /// Bearer token for the release API (`GITHUB_TOKEN`).
    pub token: Option<String>,
    pub source: PackageSource,
}

/// Command line values that override the defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub python: Option<String>,
    pub api_url: Option<String>,
    pub organization: Option<String>,
    pub from_github: bool,
}

impl Config {
    pub fn load<R: Runtime>(runtime: &R, overrides: ConfigOverrides) -> Self {
        let token = runtime
            .env_var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_some() {
            debug!("Using GITHUB_TOKEN for authentication");
        }

        Self {
            python: overrides
                .python
                .unwrap_or_else(|| DEFAULT_PYTHON.to_string()),
            api_url: overrides
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            organization: overrides
                .organization
                .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string()),
            token,
            source: if overrides.from_github {
                PackageSource::Remote
            } else {
                PackageSource::Tracked
            },
        }
    }

    /// Base URL of the organization's repositories (`https://github.com/esm-tools`).
    pub fn repository_base(&self) -> String {
        format!("{}/{}", REPOSITORY_HOST, self.organization)
    }
}
