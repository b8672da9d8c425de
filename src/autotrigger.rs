use indexmap::IndexMap;
use log::{error, info};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::{Config, ProjectSpec};
use crate::error::{AutotriggerError, Result};
use crate::output;
use crate::providers::{GitHubProvider, GitLabProvider};

/// How an existing image satisfied the candidate tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMatch {
    /// An image carries exactly the candidate tag
    Exact,
    /// An image tag starts with the candidate tag (e.g. `v1.2.2-amd64`)
    Prefix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    UpToDate(TagMatch),
    NewImage,
}

/// Decides whether `candidate` is already published among `images`.
///
/// An exact match always wins; a prefix match only counts when
/// `loose_match` is enabled.
pub fn decide(candidate: &str, images: &BTreeSet<String>, loose_match: bool) -> Decision {
    if images.contains(candidate) {
        Decision::UpToDate(TagMatch::Exact)
    } else if loose_match && images.iter().any(|image| image.starts_with(candidate)) {
        Decision::UpToDate(TagMatch::Prefix)
    } else {
        Decision::NewImage
    }
}

/// Build variables for a triggered pipeline.
///
/// The tag variable comes first; extra variables are laid over it, so an
/// extra variable with the same name replaces the tag value.
pub fn build_variables(project: &ProjectSpec, tag: &str) -> IndexMap<String, String> {
    let mut variables = IndexMap::with_capacity(project.extra_variables.len() + 1);
    variables.insert(project.tag_variable.clone(), tag.to_string());
    variables.extend(
        project
            .extra_variables
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    variables
}

/// Result of processing one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectOutcome {
    UpToDate {
        tag: String,
        matched: TagMatch,
    },
    PipelineRunning {
        tag: String,
        running: usize,
    },
    Triggered {
        tag: String,
        web_url: String,
    },
    DryRun {
        tag: String,
        #[serde(rename = "ref")]
        ref_: String,
        variables: IndexMap<String, String>,
    },
    Failed {
        kind: String,
        reason: String,
    },
}

impl ProjectOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    fn failed(err: &AutotriggerError) -> Self {
        Self::Failed {
            kind: err.kind().to_string(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub github_repo: String,
    pub gitlab_project: String,
    #[serde(flatten)]
    pub outcome: ProjectOutcome,
}

/// Outcomes of a whole run, in project order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub projects: Vec<ProjectReport>,
}

impl RunSummary {
    fn record(&mut self, project: &ProjectSpec, outcome: ProjectOutcome) {
        self.projects.push(ProjectReport {
            github_repo: project.github_repo.clone(),
            gitlab_project: project.gitlab_project.clone(),
            outcome,
        });
    }

    pub fn failures(&self) -> usize {
        self.projects
            .iter()
            .filter(|report| report.outcome.is_failure())
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failures() > 0
    }
}

/// Checks configured projects for new releases and starts pipelines for them.
pub struct Autotrigger {
    github: GitHubProvider,
    gitlab: GitLabProvider,
    loose_match: bool,
    dry_run: bool,
}

impl Autotrigger {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            github: GitHubProvider::new(
                config.github_api_url.clone(),
                config.github_token.as_ref(),
                config.release_policy,
            )?,
            gitlab: GitLabProvider::new(&config.gitlab)?,
            loose_match: config.loose_match,
            dry_run: config.dry_run,
        })
    }

    /// Processes every project in order.
    ///
    /// A failing project is reported and recorded; it never stops the
    /// remaining projects from being processed.
    pub async fn run(&self, projects: &[ProjectSpec]) -> RunSummary {
        let mut summary = RunSummary::default();

        for project in projects {
            let label = project.label();
            output::print_project_header(&label);

            let outcome = match self.process(project).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!("Failed to handle {label}: {err}");
                    ProjectOutcome::failed(&err)
                }
            };

            output::print_outcome(&outcome);
            summary.record(project, outcome);
        }

        summary
    }

    async fn process(&self, project: &ProjectSpec) -> Result<ProjectOutcome> {
        let tag = self.github.latest_tag(&project.github_repo).await?;
        output::print_detail(&format!("Determined latest tag is {tag}"));

        let info = self
            .gitlab
            .inspect(&project.gitlab_project, &tag, &project.container_name)
            .await?;

        if info.images.is_empty() {
            output::print_detail("No images match latest tag name");
        } else {
            output::print_detail(&format!(
                "Determined latest images are {}",
                info.images.iter().cloned().collect::<Vec<_>>().join(", ")
            ));
        }

        if let Decision::UpToDate(matched) = decide(&tag, &info.images, self.loose_match) {
            return Ok(ProjectOutcome::UpToDate { tag, matched });
        }

        // Advisory only: a pipeline may still start between this check and the trigger.
        let running = self.gitlab.running_pipelines(&project.gitlab_project).await?;
        if running > 0 {
            return Ok(ProjectOutcome::PipelineRunning { tag, running });
        }

        let variables = build_variables(project, &tag);

        if self.dry_run {
            info!(
                "Dry run, not triggering {} on {}",
                project.gitlab_project, info.default_branch
            );
            return Ok(ProjectOutcome::DryRun {
                tag,
                ref_: info.default_branch,
                variables,
            });
        }

        let pipeline = self
            .gitlab
            .trigger_pipeline(&project.gitlab_project, &info.default_branch, &variables)
            .await?;

        Ok(ProjectOutcome::Triggered {
            tag,
            web_url: pipeline.web_url,
        })
    }
}
