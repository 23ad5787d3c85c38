use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the extraction pipeline.
///
/// Every variant is terminal for the current run; nothing in the library
/// retries.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to parse document '{}': {message}", path.display())]
    ParseFailure { path: PathBuf, message: String },
    #[error("Authentication with the completion backend failed: {0}")]
    AuthFailure(String),
    #[error("Failed to connect to the completion backend at {url}: {source}")]
    ConnectionFailure {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Model '{model}' is not available on the completion backend: {detail}")]
    ModelNotFound { model: String, detail: String },
    #[error("Completion backend did not respond within {0:?}")]
    Timeout(std::time::Duration),
    #[error("Completion backend returned an error (status {status}): {message}")]
    UpstreamFailure { status: u16, message: String },
    #[error("Failed to build Reqwest client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Pipeline is missing a component: {0}")]
    MissingComponent(&'static str),
    #[error("Completion provider is not configured: {0}")]
    MissingProvider(String),
    #[error("Model output does not match any known extraction format: {0:?}")]
    MalformedOutput(String),
}

impl ExtractError {
    /// Status code used for failures that never produced an HTTP response.
    pub const NO_STATUS: u16 = 0;

    /// A short operator-facing remediation hint, for failures that have one.
    pub fn hint(&self) -> Option<String> {
        match self {
            ExtractError::ConnectionFailure { url, .. } => Some(format!(
                "Make sure the local inference service (Ollama) is running at '{url}'."
            )),
            ExtractError::ModelNotFound { model, .. } => Some(format!(
                "Check that the '{model}' model is installed, e.g. `ollama pull {model}`."
            )),
            ExtractError::AuthFailure(_) => {
                Some("Set a valid API key in the AI_API_KEY environment variable.".to_string())
            }
            ExtractError::Timeout(_) => Some(
                "Local inference on long prompts can be slow; raise the provider's timeout_secs."
                    .to_string(),
            ),
            _ => None,
        }
    }
}
