use graphql_client::{GraphQLQuery, QueryBody};
use log::debug;

use super::core::GitLabClient;
use crate::error::{AutotriggerError, Result};

const REGISTRY_QUERY: &str = include_str!("registry.graphql");

/// Container repositories and branch rules of a project.
pub struct GetImageRepository;

/// Tags of a container repository matching a name.
pub struct GetImages;

pub mod get_image_repository {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "getImageRepository";

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub full_path: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub project: Option<GetImageRepositoryProject>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GetImageRepositoryProject {
        pub container_repositories: Option<ContainerRepositories>,
        pub branch_rules: Option<BranchRules>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ContainerRepositories {
        pub nodes: Option<Vec<Option<ContainerRepositoryNode>>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ContainerRepositoryNode {
        pub id: String,
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct BranchRules {
        pub nodes: Option<Vec<Option<BranchRuleNode>>>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BranchRuleNode {
        pub name: String,
        pub is_default: bool,
    }
}

pub mod get_images {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "getImages";

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub id: String,
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub container_repository: Option<GetImagesContainerRepository>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GetImagesContainerRepository {
        pub tags: Option<Tags>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Tags {
        pub nodes: Option<Vec<Option<TagNode>>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct TagNode {
        pub name: String,
    }
}

impl GraphQLQuery for GetImageRepository {
    type Variables = get_image_repository::Variables;
    type ResponseData = get_image_repository::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: REGISTRY_QUERY,
            operation_name: get_image_repository::OPERATION_NAME,
        }
    }
}

impl GraphQLQuery for GetImages {
    type Variables = get_images::Variables;
    type ResponseData = get_images::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: REGISTRY_QUERY,
            operation_name: get_images::OPERATION_NAME,
        }
    }
}

impl GitLabClient {
    /// Fetch the container repositories and branch rules of a project.
    ///
    /// # Errors
    ///
    /// Returns [`AutotriggerError::NotFound`] if the project does not exist or
    /// is not visible to the token.
    pub async fn fetch_image_repository(
        &self,
        project_path: &str,
    ) -> Result<get_image_repository::GetImageRepositoryProject> {
        let variables = get_image_repository::Variables {
            full_path: project_path.to_string(),
        };

        let data = self
            .execute_graphql_request::<GetImageRepository>(variables)
            .await?;

        data.project
            .ok_or_else(|| AutotriggerError::NotFound(format!("Project '{project_path}'")))
    }

    /// Fetch the names of tags in a container repository that match `name`.
    ///
    /// GitLab matches tag names by substring, so the result can contain tags
    /// that merely contain `name`.
    pub async fn fetch_image_tags(&self, repository_id: &str, name: &str) -> Result<Vec<String>> {
        let variables = get_images::Variables {
            id: repository_id.to_string(),
            name: name.to_string(),
        };

        let data = self.execute_graphql_request::<GetImages>(variables).await?;

        let repository = data.container_repository.ok_or_else(|| {
            AutotriggerError::NotFound(format!("Container repository '{repository_id}'"))
        })?;

        let tags: Vec<String> = repository
            .tags
            .and_then(|tags| tags.nodes)
            .into_iter()
            .flatten()
            .flatten()
            .map(|tag| tag.name)
            .collect();

        debug!("Found {} tags matching '{name}' in {repository_id}", tags.len());

        Ok(tags)
    }
}
