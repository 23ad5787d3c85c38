pub mod gemini;
pub mod local;

use crate::types::{CompletionResult, GenerationOptions};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a text-completion backend.
///
/// This trait defines a common interface over the hosted Gemini API and a
/// locally running Ollama server. Implementations send exactly one request
/// per call and never retry.
#[async_trait]
pub trait CompletionBackend: Send + Sync + Debug + DynClone {
    /// Generates a completion for the given prompt.
    ///
    /// The result is the model's text with surrounding whitespace trimmed.
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> CompletionResult;

    /// A short human-readable name used in logs, e.g. `ollama(llama3.1:latest)`.
    fn name(&self) -> String;
}

dyn_clone::clone_trait_object!(CompletionBackend);

/// Maps a transport-level reqwest error onto the pipeline's error taxonomy.
pub(crate) fn map_transport_error(
    err: reqwest::Error,
    url: &str,
    timeout: std::time::Duration,
) -> crate::errors::ExtractError {
    use crate::errors::ExtractError;

    if err.is_timeout() {
        ExtractError::Timeout(timeout)
    } else if err.is_connect() {
        ExtractError::ConnectionFailure {
            url: url.to_string(),
            source: err,
        }
    } else {
        ExtractError::UpstreamFailure {
            status: err
                .status()
                .map(|s| s.as_u16())
                .unwrap_or(ExtractError::NO_STATUS),
            message: err.to_string(),
        }
    }
}
