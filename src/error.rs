use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutotriggerError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Got a {status} from {service}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("GraphQL query {operation} failed: {errors}")]
    GraphQL { operation: String, errors: String },

    #[error("GraphQL query {0} returned no data")]
    NoResponseData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AutotriggerError {
    /// Coarse category used when reporting a failed project.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::NotFound(_) => "not found",
            Self::Api { .. }
            | Self::GraphQL { .. }
            | Self::NoResponseData(_)
            | Self::Network(_)
            | Self::Json(_) => "upstream",
        }
    }
}

pub type Result<T> = std::result::Result<T, AutotriggerError>;
