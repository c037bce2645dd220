use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while bootstrapping or running the workload
#[derive(Debug, Error)]
pub enum LoadTestError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Login for {account} rejected: HTTP {status}")]
    LoginRejected { account: String, status: StatusCode },

    #[error("Login response for {account} has no token")]
    MissingToken { account: String },

    #[error("Invalid JSON from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {endpoint} has no `{field}` field")]
    MissingField {
        endpoint: &'static str,
        field: &'static str,
    },
}

impl LoadTestError {
    /// Whether the error happened before any simulated user could start
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            LoadTestError::Config(_)
                | LoadTestError::InvalidConfig(_)
                | LoadTestError::LoginRejected { .. }
                | LoadTestError::MissingToken { .. }
        )
    }
}
