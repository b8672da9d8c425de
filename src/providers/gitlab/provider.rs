use indexmap::IndexMap;
use log::{debug, info};

use crate::config::GitLabInstance;
use crate::error::{AutotriggerError, Result};
use crate::providers::gitlab::client::GitLabClient;

use super::types::{ContainerInfo, PipelineTriggerResult};

/// Registry and pipeline operations against one GitLab instance.
///
/// Wraps the GraphQL and REST client and turns raw responses into the
/// answers the trigger loop needs.
pub struct GitLabProvider {
    pub client: GitLabClient,
}

impl GitLabProvider {
    /// Creates a provider for the given instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the API endpoint URLs cannot be constructed.
    pub fn new(instance: &GitLabInstance) -> Result<Self> {
        Ok(Self {
            client: GitLabClient::new(instance)?,
        })
    }

    /// Looks up the images published for `candidate_tag` and the default branch.
    ///
    /// Resolves `container_name` to a container repository of the project
    /// (an empty name selects the unnamed repository), then lists that
    /// repository's tags filtered by `candidate_tag`.
    ///
    /// # Errors
    ///
    /// Returns [`AutotriggerError::NotFound`] if the project, the container
    /// repository or a default branch rule is missing, and an upstream error
    /// if either GraphQL call fails.
    pub async fn inspect(
        &self,
        project_path: &str,
        candidate_tag: &str,
        container_name: &str,
    ) -> Result<ContainerInfo> {
        let project = self.client.fetch_image_repository(project_path).await?;

        let repository_id = project
            .container_repositories
            .and_then(|repos| repos.nodes)
            .into_iter()
            .flatten()
            .flatten()
            .find(|repo| repo.name == container_name)
            .map(|repo| repo.id)
            .ok_or_else(|| {
                AutotriggerError::NotFound(format!(
                    "No container repository named '{container_name}' in {project_path}, \
                     does it contain container images?"
                ))
            })?;

        let default_branch = project
            .branch_rules
            .and_then(|rules| rules.nodes)
            .into_iter()
            .flatten()
            .flatten()
            .find(|rule| rule.is_default)
            .map(|rule| rule.name)
            .ok_or_else(|| {
                AutotriggerError::NotFound(format!("No default branch rule in {project_path}"))
            })?;

        debug!("Resolved container repository {repository_id} and default branch {default_branch}");

        let images = self
            .client
            .fetch_image_tags(&repository_id, candidate_tag)
            .await?
            .into_iter()
            .collect();

        Ok(ContainerInfo {
            images,
            default_branch,
        })
    }

    /// Number of pipelines currently running for the project.
    pub async fn running_pipelines(&self, project_path: &str) -> Result<usize> {
        self.client.running_pipeline_count(project_path).await
    }

    /// Starts a pipeline on `ref_` with `variables`.
    pub async fn trigger_pipeline(
        &self,
        project_path: &str,
        ref_: &str,
        variables: &IndexMap<String, String>,
    ) -> Result<PipelineTriggerResult> {
        info!("Triggering pipeline for {project_path} on {ref_}");
        self.client
            .trigger_pipeline(project_path, ref_, variables)
            .await
    }
}
