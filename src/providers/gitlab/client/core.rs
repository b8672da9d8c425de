use graphql_client::{GraphQLQuery, Response as GraphQLResponse};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::auth::Token;
use crate::config::GitLabInstance;
use crate::error::{AutotriggerError, Result};

const USER_AGENT: &str = concat!("autotrigger/", env!("CARGO_PKG_VERSION"));

pub struct GitLabClient {
    pub client: Client,
    pub graphql_url: Url,
    pub api_url: Url,
    pub token: Token,
}

/// Just the `errors` member of a GraphQL response, read independently of the
/// shape of `data`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    errors: Option<Vec<graphql_client::Error>>,
}

impl GitLabClient {
    pub fn new(instance: &GitLabInstance) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AutotriggerError::Config(format!("Failed to create HTTP client: {e}")))?;

        let graphql_url = instance
            .base_url
            .join("api/graphql")
            .map_err(|e| AutotriggerError::Config(format!("Invalid GraphQL URL: {e}")))?;

        let api_url = instance
            .base_url
            .join("api/v4/")
            .map_err(|e| AutotriggerError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            graphql_url,
            api_url,
            token: instance.token.clone(),
        })
    }

    /// Construct a project-scoped REST URL, e.g. `projects/group%2Fproject/pipeline`
    pub fn project_url(&self, project: &str, path: &str) -> Result<Url> {
        self.api_url
            .join(&format!("projects/{}/{path}", urlencoding::encode(project)))
            .map_err(|e| AutotriggerError::Config(format!("Invalid project URL: {e}")))
    }

    /// Execute a GraphQL operation and return its data.
    ///
    /// GitLab answers query errors with `200 OK`, so a non-empty `errors`
    /// array fails the call whatever the HTTP status is.
    pub(super) async fn execute_graphql_request<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData> {
        let request_body = Q::build_query(variables);
        let operation = request_body.operation_name;
        debug!("POST {} ({operation})", self.graphql_url);

        let response = self
            .client
            .post(self.graphql_url.clone())
            .bearer_auth(self.token.as_str())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if let Ok(ErrorEnvelope {
            errors: Some(errors),
        }) = serde_json::from_str::<ErrorEnvelope>(&body)
        {
            if !errors.is_empty() {
                return Err(AutotriggerError::GraphQL {
                    operation: operation.to_string(),
                    errors: errors
                        .iter()
                        .map(|e| e.message.as_str())
                        .collect::<Vec<_>>()
                        .join("\n\t"),
                });
            }
        }

        if !status.is_success() {
            return Err(AutotriggerError::Api {
                service: "GitLab",
                status: status.as_u16(),
                message: body,
            });
        }

        let response_body: GraphQLResponse<Q::ResponseData> = serde_json::from_str(&body)?;

        response_body
            .data
            .ok_or_else(|| AutotriggerError::NoResponseData(operation.to_string()))
    }
}
