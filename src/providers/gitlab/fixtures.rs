//! Mock GitLab endpoints shared by tests.

use mockito::{Matcher, Mock, Server};
use serde_json::json;

use crate::auth::Token;
use crate::config::GitLabInstance;

pub const TOKEN: &str = "glpat-test";

pub fn instance(server: &Server) -> GitLabInstance {
    GitLabInstance::from_domain(&server.url(), Token::from(TOKEN)).unwrap()
}

fn graphql(server: &mut Server, operation: &str, variables: serde_json::Value) -> mockito::Mock {
    server
        .mock("POST", "/api/graphql")
        .match_header("authorization", format!("Bearer {TOKEN}").as_str())
        .match_body(Matcher::PartialJson(json!({
            "operationName": operation,
            "variables": variables,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
}

/// `getImageRepository` answering with `(id, name)` repositories and an
/// optional default branch rule.
pub async fn mock_image_repository(
    server: &mut Server,
    project: &str,
    repositories: &[(&str, &str)],
    default_branch: Option<&str>,
) -> Mock {
    let repositories: Vec<_> = repositories
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();

    let mut branch_rules = vec![json!({ "name": "feature/*", "isDefault": false })];
    if let Some(branch) = default_branch {
        branch_rules.push(json!({ "name": branch, "isDefault": true }));
    }

    graphql(
        server,
        "getImageRepository",
        json!({ "fullPath": project }),
    )
    .with_body(
        json!({
            "data": {
                "project": {
                    "containerRepositories": { "nodes": repositories },
                    "branchRules": { "nodes": branch_rules },
                }
            }
        })
        .to_string(),
    )
    .create_async()
    .await
}

/// `getImages` for repository `id` returning `tags`.
pub async fn mock_images(server: &mut Server, id: &str, tags: &[&str]) -> Mock {
    let nodes: Vec<_> = tags.iter().map(|name| json!({ "name": name })).collect();

    graphql(server, "getImages", json!({ "id": id }))
        .with_body(
            json!({
                "data": {
                    "containerRepository": { "tags": { "nodes": nodes } }
                }
            })
            .to_string(),
        )
        .create_async()
        .await
}

/// `getRunningPipelines` reporting `count` running pipelines.
pub async fn mock_running_pipelines(server: &mut Server, project: &str, count: usize) -> Mock {
    graphql(
        server,
        "getRunningPipelines",
        json!({ "fullPath": project }),
    )
    .with_body(
        json!({
            "data": { "project": { "pipelines": { "count": count } } }
        })
        .to_string(),
    )
    .create_async()
    .await
}

/// REST pipeline creation for an already URL-encoded project path.
pub async fn mock_trigger(
    server: &mut Server,
    encoded_project: &str,
    ref_: &str,
    variables: serde_json::Value,
    web_url: &str,
) -> Mock {
    server
        .mock(
            "POST",
            format!("/api/v4/projects/{encoded_project}/pipeline").as_str(),
        )
        .match_query(Matcher::UrlEncoded("ref".into(), ref_.into()))
        .match_header("private-token", TOKEN)
        .match_body(Matcher::Json(json!({ "variables": variables })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({ "id": 42, "web_url": web_url }).to_string())
        .create_async()
        .await
}
