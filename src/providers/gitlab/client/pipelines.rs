use graphql_client::{GraphQLQuery, QueryBody};
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::core::GitLabClient;
use crate::error::{AutotriggerError, Result};
use crate::providers::gitlab::types::PipelineTriggerResult;

/// Number of running pipelines of a project, bounded by the page size.
pub struct GetRunningPipelines;

pub mod get_running_pipelines {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "getRunningPipelines";

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub full_path: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub project: Option<GetRunningPipelinesProject>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GetRunningPipelinesProject {
        pub pipelines: Option<Pipelines>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Pipelines {
        pub count: usize,
    }
}

impl GraphQLQuery for GetRunningPipelines {
    type Variables = get_running_pipelines::Variables;
    type ResponseData = get_running_pipelines::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: include_str!("pipelines.graphql"),
            operation_name: get_running_pipelines::OPERATION_NAME,
        }
    }
}

#[derive(Serialize)]
struct TriggerPipelineRequest<'a> {
    variables: Vec<PipelineVariable<'a>>,
}

#[derive(Serialize)]
struct PipelineVariable<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Deserialize)]
struct TriggerPipelineResponse {
    web_url: String,
}

impl GitLabClient {
    /// Count pipelines currently in the `RUNNING` state.
    pub async fn running_pipeline_count(&self, project_path: &str) -> Result<usize> {
        let variables = get_running_pipelines::Variables {
            full_path: project_path.to_string(),
        };

        let data = self
            .execute_graphql_request::<GetRunningPipelines>(variables)
            .await?;

        let project = data
            .project
            .ok_or_else(|| AutotriggerError::NotFound(format!("Project '{project_path}'")))?;

        let count = project.pipelines.map_or(0, |p| p.count);
        debug!("{project_path} has {count} running pipelines");

        Ok(count)
    }

    /// Create a pipeline on `ref_` with the given CI variables.
    ///
    /// # Arguments
    /// * `project` - Project full path or numeric ID
    /// * `ref_` - Branch to run the pipeline on
    /// * `variables` - CI variables, sent in iteration order
    ///
    /// # Errors
    /// Returns [`AutotriggerError::Api`] with the response body if GitLab
    /// rejects the request.
    pub async fn trigger_pipeline(
        &self,
        project: &str,
        ref_: &str,
        variables: &IndexMap<String, String>,
    ) -> Result<PipelineTriggerResult> {
        let mut url = self.project_url(project, "pipeline")?;
        url.query_pairs_mut().append_pair("ref", ref_);

        let body = TriggerPipelineRequest {
            variables: variables
                .iter()
                .map(|(key, value)| PipelineVariable {
                    key: key.as_str(),
                    value: value.as_str(),
                })
                .collect(),
        };

        debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .header("PRIVATE-TOKEN", self.token.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(AutotriggerError::Api {
                service: "GitLab",
                status: status.as_u16(),
                message,
            });
        }

        let created: TriggerPipelineResponse = response.json().await?;
        info!("Created pipeline {} for {project}", created.web_url);

        Ok(PipelineTriggerResult {
            web_url: created.web_url,
        })
    }
}
