use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{AutotriggerError, Result};

use super::types::GitHubRelease;

const USER_AGENT: &str = concat!("autotrigger/", env!("CARGO_PKG_VERSION"));

/// Page size used when scanning recent releases.
pub const RELEASES_PER_PAGE: u8 = 10;

/// GitHub REST API client for release lookups.
pub struct GitHubClient {
    /// HTTP client with auth and accept headers preset
    client: reqwest::Client,
    /// Base URL for GitHub API, ending with a slash
    base_url: Url,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., <https://api.github.com/>)
    /// * `token` - Optional GitHub personal access token
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be built.
    pub fn new(base_url: Url, token: Option<&Token>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|e| AutotriggerError::Config(format!("Invalid GitHub token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| AutotriggerError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn repo_url(&self, repo: &str, path: &str) -> Result<Url> {
        self.base_url
            .join(&format!("repos/{repo}/{path}"))
            .map_err(|e| AutotriggerError::Config(format!("Invalid GitHub URL for {repo}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(AutotriggerError::Api {
                service: "GitHub",
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the release GitHub considers latest.
    ///
    /// GitHub already excludes drafts and pre-releases from this endpoint.
    pub async fn fetch_latest_release(&self, repo: &str) -> Result<GitHubRelease> {
        let url = self.repo_url(repo, "releases/latest")?;
        self.get_json(url).await
    }

    /// Fetch the most recent page of releases, newest first.
    pub async fn fetch_releases(&self, repo: &str) -> Result<Vec<GitHubRelease>> {
        let url = self.repo_url(repo, &format!("releases?per_page={RELEASES_PER_PAGE}"))?;
        self.get_json(url).await
    }
}
