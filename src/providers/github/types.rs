use serde::Deserialize;

/// A GitHub release as returned by the REST API.
///
/// Only the fields needed to pick a release are deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitHubRelease {
    /// Git tag the release points at (e.g., "v1.2.3")
    pub tag_name: String,
    /// Unpublished draft release
    #[serde(default)]
    pub draft: bool,
    /// Release marked as a pre-release
    #[serde(default)]
    pub prerelease: bool,
}

impl GitHubRelease {
    /// Published and not flagged as a pre-release.
    pub fn is_stable(&self) -> bool {
        !self.draft && !self.prerelease
    }
}
