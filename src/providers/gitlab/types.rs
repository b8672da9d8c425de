use std::collections::BTreeSet;

/// What a project's registry already holds for a candidate tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Image tags matching the candidate tag name
    pub images: BTreeSet<String>,
    /// Branch GitLab marks as default; pipelines are triggered on it
    pub default_branch: String,
}

/// A pipeline created through the REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineTriggerResult {
    /// Web page of the new pipeline
    pub web_url: String,
}
