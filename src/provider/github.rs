//! GitHub provider implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};

use crate::http::{HttpClient, NonRetryableError};
use crate::package::PackageName;
use crate::package::version::{highest_tag, strip_tag_prefix};

use super::Provider;

/// Page size for list endpoints (GitHub's maximum).
const PER_PAGE: usize = 100;

/// Stop after this many pages to avoid looping on a misbehaving server.
const MAX_PAGES: usize = 10;

/// Repositories of one organization, possibly cut short at `MAX_PAGES`.
struct RepositoryListing {
    repositories: Vec<api::Repository>,
    truncated: bool,
}

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub tag_name: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Tag {
        pub name: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Repository {
        pub name: String,
    }
}

/// GitHub provider implementation.
pub struct GitHubProvider {
    http_client: HttpClient,
    api_url: String,
    organization: String,
}

impl GitHubProvider {
    pub fn new(http_client: HttpClient, api_url: &str, organization: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            organization: organization.to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn fetch_latest_release(&self, package: &PackageName) -> Result<api::Release> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url, self.organization, package
        );
        debug!("Fetching latest release from {}...", url);
        self.http_client.get_json(&url).await
    }

    async fn fetch_tags(&self, package: &PackageName) -> Result<Vec<api::Tag>> {
        let url = format!(
            "{}/repos/{}/{}/tags",
            self.api_url, self.organization, package
        );
        debug!("Fetching tags from {}...", url);
        let per_page = PER_PAGE.to_string();
        self.http_client
            .get_json_with_query(&url, &[("per_page", per_page.as_str())])
            .await
    }

    async fn fetch_repositories(&self) -> Result<RepositoryListing> {
        let mut repositories = Vec::new();
        let url = format!("{}/orgs/{}/repos", self.api_url, self.organization);
        let per_page = PER_PAGE.to_string();

        for page in 1..=MAX_PAGES {
            let page_str = page.to_string();
            debug!("Fetching repositories page {} from {}...", page, url);

            let parsed: Vec<api::Repository> = self
                .http_client
                .get_json_with_query(
                    &url,
                    &[("per_page", per_page.as_str()), ("page", page_str.as_str())],
                )
                .await?;

            let len = parsed.len();
            repositories.extend(parsed);

            if len < PER_PAGE {
                return Ok(RepositoryListing {
                    repositories,
                    truncated: false,
                });
            }
        }

        Ok(RepositoryListing {
            repositories,
            truncated: true,
        })
    }
}

#[async_trait]
impl Provider for GitHubProvider {
    fn organization(&self) -> String {
        self.organization.clone()
    }

    /// Uses the latest release; repositories that only push tags fall back to
    /// the highest version-like tag.
    async fn latest_version(&self, package: &PackageName) -> Result<String> {
        match self.fetch_latest_release(package).await {
            Ok(release) => Ok(strip_tag_prefix(&release.tag_name).to_string()),
            Err(e)
                if matches!(
                    e.downcast_ref::<NonRetryableError>(),
                    Some(NonRetryableError::NotFound(_))
                ) =>
            {
                debug!("{} has no releases, looking at tags", package);
                let tags = self.fetch_tags(package).await?;
                let tag = highest_tag(tags.iter().map(|t| t.name.as_str()))
                    .with_context(|| format!("No release or version tag found for {}", package))?;
                Ok(strip_tag_prefix(tag).to_string())
            }
            Err(e) => Err(e),
        }
    }

    async fn list_repositories(&self) -> Result<Vec<String>> {
        let listing = self
            .fetch_repositories()
            .await
            .with_context(|| format!("Failed to list repositories of {}", self.organization))?;
        if listing.truncated {
            warn!(
                "{} has more than {} repositories, only the first {} are listed",
                self.organization,
                MAX_PAGES * PER_PAGE,
                listing.repositories.len()
            );
        }
        Ok(listing.repositories.into_iter().map(|r| r.name).collect())
    }
}
