use indexmap::IndexMap;
use std::str::FromStr;
use url::Url;

use crate::auth::Token;
use crate::error::{AutotriggerError, Result};

pub const DEFAULT_TAG_VARIABLE: &str = "TAG_NAME";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Raw configuration values as read from the environment or the command line.
///
/// Everything is optional here; [`Config::from_source`] decides what is
/// required so that a missing value surfaces as a configuration error rather
/// than a usage error.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    pub gitlab_token: Option<String>,
    pub gitlab_domain: Option<String>,
    pub projects: Option<String>,
    pub github_token: Option<String>,
    pub github_api_url: Option<String>,
    pub loose_match: Option<String>,
    pub release_policy: Option<String>,
    pub dry_run: bool,
}

/// Validated configuration for a single run.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitLab instance every project lives on
    pub gitlab: GitLabInstance,

    /// Optional GitHub token, raises the API rate limit
    pub github_token: Option<Token>,

    /// GitHub REST API base URL
    pub github_api_url: Url,

    /// Treat images that merely start with the release tag as published
    pub loose_match: bool,

    /// How the latest GitHub release is selected
    pub release_policy: ReleasePolicy,

    /// Report what would be triggered without starting pipelines
    pub dry_run: bool,

    /// Projects to check, in the configured order
    pub projects: Vec<ProjectSpec>,
}

/// A GitLab instance and the token used against it.
#[derive(Debug, Clone)]
pub struct GitLabInstance {
    /// Base URL, always ending with a slash
    pub base_url: Url,
    pub token: Token,
}

impl GitLabInstance {
    /// Builds an instance from a bare domain (`gitlab.example.com`, implying
    /// `https://`) or a full URL with scheme.
    pub fn from_domain(domain: &str, token: Token) -> Result<Self> {
        Ok(Self {
            base_url: base_url(domain, "GITLAB_DOMAIN")?,
            token,
        })
    }
}

/// One row of the project list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    /// GitHub repository in `owner/repo` form
    pub github_repo: String,
    /// GitLab project full path (e.g., "group/project")
    pub gitlab_project: String,
    /// Container repository name inside the project; empty for the unnamed one
    pub container_name: String,
    /// Build variable that receives the release tag
    pub tag_variable: String,
    /// Additional build variables, in configured order
    pub extra_variables: IndexMap<String, String>,
}

impl ProjectSpec {
    /// Human-readable identity used in progress and error lines.
    pub fn label(&self) -> String {
        format!("{} → {}", self.github_repo, self.gitlab_project)
    }
}

/// Strategy for picking the release to compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleasePolicy {
    /// Ask GitHub for `releases/latest`
    #[default]
    Latest,
    /// Scan the most recent releases and pick the highest stable tag name
    Scan,
}

impl FromStr for ReleasePolicy {
    type Err = AutotriggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "scan" => Ok(Self::Scan),
            other => Err(AutotriggerError::Config(format!(
                "Unknown release policy '{other}', expected 'latest' or 'scan'"
            ))),
        }
    }
}

impl Config {
    /// Validates raw values into a runnable configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AutotriggerError::Config`] if a required value is missing or
    /// blank, or if any value is malformed.
    pub fn from_source(source: ConfigSource) -> Result<Self> {
        let gitlab_token = required(source.gitlab_token, "GITLAB_TOKEN")?;
        let gitlab_domain = required(source.gitlab_domain, "GITLAB_DOMAIN")?;
        let projects = required(source.projects, "AUTOTRIGGER_PROJECTS")?;

        let projects = parse_projects(&projects)?;
        if projects.is_empty() {
            return Err(AutotriggerError::Config(
                "AUTOTRIGGER_PROJECTS does not contain any project".to_string(),
            ));
        }

        let gitlab = GitLabInstance::from_domain(&gitlab_domain, Token::from(gitlab_token))?;

        let github_api_url = base_url(
            source
                .github_api_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(DEFAULT_GITHUB_API_URL),
            "GITHUB_API_URL",
        )?;

        let loose_match = match source.loose_match.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_flag("AUTOTRIGGER_LOOSE_MATCH", raw)?,
            _ => true,
        };

        let release_policy = match source.release_policy.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => ReleasePolicy::default(),
        };

        Ok(Self {
            gitlab,
            github_token: source
                .github_token
                .filter(|t| !t.trim().is_empty())
                .map(Token::from),
            github_api_url,
            loose_match,
            release_policy,
            dry_run: source.dry_run,
            projects,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AutotriggerError::Config(format!("{name} is not set")))
}

fn base_url(raw: &str, name: &str) -> Result<Url> {
    let raw = raw.trim().trim_end_matches('/');
    let with_scheme = if raw.contains("://") {
        format!("{raw}/")
    } else {
        format!("https://{raw}/")
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| AutotriggerError::Config(format!("Invalid {name} '{raw}': {e}")))?;

    if url.host_str().is_none() {
        return Err(AutotriggerError::Config(format!(
            "Invalid {name} '{raw}': missing host"
        )));
    }

    Ok(url)
}

/// Parses a boolean flag. Accepts `true/false`, `1/0`, `yes/no` and `on/off`.
pub fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(AutotriggerError::Config(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

/// Parses the project list.
///
/// Entries are separated by `,` and fields by `|`:
/// `owner/repo|group/project|container|TAG_VARIABLE|extra`.
/// Blank entries are ignored, so a trailing comma is harmless.
pub fn parse_projects(raw: &str) -> Result<Vec<ProjectSpec>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_project_entry)
        .collect()
}

fn parse_project_entry(entry: &str) -> Result<ProjectSpec> {
    let mut fields = entry.split('|').map(str::trim);

    let github_repo = fields.next().unwrap_or_default();
    let gitlab_project = fields.next().unwrap_or_default();
    if github_repo.is_empty() || gitlab_project.is_empty() {
        return Err(AutotriggerError::Config(format!(
            "Project entry '{entry}' must start with 'owner/repo|group/project'"
        )));
    }

    if !is_owner_repo(github_repo) {
        return Err(AutotriggerError::Config(format!(
            "GitHub repository '{github_repo}' must be in format 'owner/repo'"
        )));
    }

    let container_name = fields.next().unwrap_or_default().to_string();
    let tag_variable = fields
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_TAG_VARIABLE)
        .to_string();
    let extra_variables = match fields.next() {
        Some(raw) => parse_extra_variables(raw)?,
        None => IndexMap::new(),
    };

    if fields.next().is_some() {
        return Err(AutotriggerError::Config(format!(
            "Project entry '{entry}' has more than 5 fields"
        )));
    }

    Ok(ProjectSpec {
        github_repo: github_repo.to_string(),
        gitlab_project: gitlab_project.to_string(),
        container_name,
        tag_variable,
        extra_variables,
    })
}

fn is_owner_repo(repo: &str) -> bool {
    let mut parts = repo.split('/');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    )
}

/// Parses the extra-variables field.
///
/// The whole field is percent-encoded so it never contains a raw `,` or `|`.
/// Once decoded it is a `,`-separated list of `key=value` pairs, split on the
/// first `=`. A repeated key keeps its first position and takes the last value.
pub fn parse_extra_variables(raw: &str) -> Result<IndexMap<String, String>> {
    let decoded = urlencoding::decode(raw).map_err(|e| {
        AutotriggerError::Config(format!("Extra variables '{raw}' are not valid UTF-8: {e}"))
    })?;

    let mut variables = IndexMap::new();
    for pair in decoded.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            AutotriggerError::Config(format!("Extra variable '{pair}' must be 'key=value'"))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(AutotriggerError::Config(format!(
                "Extra variable '{pair}' has an empty key"
            )));
        }

        variables.insert(key.to_string(), value.to_string());
    }

    Ok(variables)
}
