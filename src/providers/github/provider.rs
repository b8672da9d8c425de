use log::{debug, info};
use url::Url;

use crate::auth::Token;
use crate::config::ReleasePolicy;
use crate::error::{AutotriggerError, Result};

use super::client::GitHubClient;
use super::types::GitHubRelease;

/// Resolves the release tag a GitHub repository currently ships.
pub struct GitHubProvider {
    client: GitHubClient,
    policy: ReleasePolicy,
}

impl GitHubProvider {
    /// Create a new GitHub release provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL
    /// * `token` - Optional GitHub personal access token
    /// * `policy` - How the latest release is selected
    pub fn new(base_url: Url, token: Option<&Token>, policy: ReleasePolicy) -> Result<Self> {
        Ok(Self {
            client: GitHubClient::new(base_url, token)?,
            policy,
        })
    }

    /// Returns the tag of the latest stable release of `repo` (`owner/repo`).
    ///
    /// # Errors
    ///
    /// Returns an upstream error on a non-success response, and
    /// [`AutotriggerError::NotFound`] when scanning finds no stable release.
    pub async fn latest_tag(&self, repo: &str) -> Result<String> {
        let tag = match self.policy {
            ReleasePolicy::Latest => self.client.fetch_latest_release(repo).await?.tag_name,
            ReleasePolicy::Scan => {
                let releases = self.client.fetch_releases(repo).await?;
                debug!("Fetched {} releases for {repo}", releases.len());
                select_latest_stable(releases).ok_or_else(|| {
                    AutotriggerError::NotFound(format!(
                        "Could not determine latest release of {repo}"
                    ))
                })?
            }
        };

        info!("Latest release of {repo} is {tag}");
        Ok(tag)
    }
}

/// Picks the highest tag name among non-draft, non-prerelease releases.
///
/// Tags are compared as plain strings.
fn select_latest_stable(releases: Vec<GitHubRelease>) -> Option<String> {
    releases
        .into_iter()
        .filter(GitHubRelease::is_stable)
        .map(|release| release.tag_name)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn release(tag: &str, draft: bool, prerelease: bool) -> GitHubRelease {
        GitHubRelease {
            tag_name: tag.to_string(),
            draft,
            prerelease,
        }
    }

    fn provider(server: &Server, policy: ReleasePolicy) -> GitHubProvider {
        let base_url = Url::parse(&format!("{}/", server.url())).unwrap();
        GitHubProvider::new(base_url, Some(&Token::from("ghp-test")), policy).unwrap()
    }

    #[test]
    fn test_select_latest_stable_skips_drafts_and_prereleases() {
        let releases = vec![
            release("v1.3.0-rc1", false, true),
            release("v1.4.0", true, false),
            release("v1.2.1", false, false),
            release("v1.2.2", false, false),
        ];
        assert_eq!(select_latest_stable(releases), Some("v1.2.2".to_string()));
    }

    #[test]
    fn test_select_latest_stable_none_qualifying() {
        let releases = vec![release("v2.0.0-beta", false, true)];
        assert_eq!(select_latest_stable(releases), None);
        assert_eq!(select_latest_stable(Vec::new()), None);
    }

    #[tokio::test]
    async fn test_latest_policy_uses_latest_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/element-hq/synapse/releases/latest")
            .match_header("authorization", "Bearer ghp-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"tag_name": "v1.3.0", "draft": false, "prerelease": false}"#)
            .create_async()
            .await;

        let tag = provider(&server, ReleasePolicy::Latest)
            .latest_tag("element-hq/synapse")
            .await
            .unwrap();

        assert_eq!(tag, "v1.3.0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_scan_policy_filters_release_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/element-hq/synapse/releases")
            .match_query(mockito::Matcher::UrlEncoded(
                "per_page".into(),
                "10".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"tag_name": "v1.3.0rc1", "draft": false, "prerelease": true},
                    {"tag_name": "v1.2.2", "draft": false, "prerelease": false},
                    {"tag_name": "v1.2.1", "draft": false, "prerelease": false}
                ]"#,
            )
            .create_async()
            .await;

        let tag = provider(&server, ReleasePolicy::Scan)
            .latest_tag("element-hq/synapse")
            .await
            .unwrap();

        assert_eq!(tag, "v1.2.2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_scan_policy_without_stable_release_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"tag_name": "v0.1.0", "draft": true, "prerelease": false}]"#)
            .create_async()
            .await;

        let err = provider(&server, ReleasePolicy::Scan)
            .latest_tag("owner/repo")
            .await
            .unwrap_err();

        assert!(matches!(err, AutotriggerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/owner/repo/releases/latest")
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let err = provider(&server, ReleasePolicy::Latest)
            .latest_tag("owner/repo")
            .await
            .unwrap_err();

        match err {
            AutotriggerError::Api {
                service,
                status,
                message,
            } => {
                assert_eq!(service, "GitHub");
                assert_eq!(status, 404);
                assert!(message.contains("Not Found"));
            }
            other => panic!("Expected API error, got {other:?}"),
        }
    }
}
