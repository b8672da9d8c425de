use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use crate::autotrigger::Autotrigger;
use crate::config::{Config, ConfigSource};
use crate::output;

#[derive(Parser)]
#[command(name = "autotrigger")]
#[command(
    author,
    version,
    about = "Trigger GitLab pipelines when a GitHub project publishes a new release",
    long_about = None
)]
pub struct Cli {
    /// GitLab API token
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    gitlab_token: Option<String>,

    /// GitLab domain (e.g. gitlab.example.com) or base URL
    #[arg(long, env = "GITLAB_DOMAIN")]
    gitlab_domain: Option<String>,

    /// Projects as 'owner/repo|group/project|container|TAG_VARIABLE|extra', comma separated
    #[arg(short = 'P', long, env = "AUTOTRIGGER_PROJECTS")]
    projects: Option<String>,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    #[arg(long, env = "GITHUB_API_URL")]
    github_api_url: Option<String>,

    /// Treat images whose tag starts with the release tag as published [default: true]
    #[arg(long, env = "AUTOTRIGGER_LOOSE_MATCH")]
    loose_match: Option<String>,

    /// 'latest' uses GitHub's latest release, 'scan' picks the highest stable tag of recent releases
    #[arg(long, env = "AUTOTRIGGER_RELEASE_POLICY")]
    release_policy: Option<String>,

    /// Report what would be triggered without starting pipelines
    #[arg(short = 'n', long, default_value_t = false)]
    dry_run: bool,

    /// Write a JSON summary of the run to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, default_value_t = false)]
    pretty: bool,
}

impl Cli {
    fn config_source(&self) -> ConfigSource {
        ConfigSource {
            gitlab_token: self.gitlab_token.clone(),
            gitlab_domain: self.gitlab_domain.clone(),
            projects: self.projects.clone(),
            github_token: self.github_token.clone(),
            github_api_url: self.github_api_url.clone(),
            loose_match: self.loose_match.clone(),
            release_policy: self.release_policy.clone(),
            dry_run: self.dry_run,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::from_source(self.config_source())?;

        info!(
            "Checking {} project(s) against {} (loose match: {}, policy: {:?})",
            config.projects.len(),
            config.gitlab.base_url,
            config.loose_match,
            config.release_policy
        );

        let autotrigger = Autotrigger::new(&config)?;
        let summary = autotrigger.run(&config.projects).await;

        output::print_summary(&summary);

        if let Some(output_path) = &self.output {
            output::write_summary(&summary, self.pretty, output_path)?;
            info!("Summary written to: {}", output_path.display());
        }

        if summary.has_failures() {
            bail!(
                "At least one project failed ({} of {})",
                summary.failures(),
                summary.projects.len()
            );
        }

        Ok(())
    }
}
