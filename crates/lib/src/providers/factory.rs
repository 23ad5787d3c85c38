//! # Completion Backend Factory
//!
//! Creates completion backend instances from a `ProviderConfig`, so that the
//! choice between the hosted and the local model is made by configuration at
//! the call site instead of by branching inside the pipeline.

use crate::{
    errors::ExtractError,
    providers::ai::{
        gemini::{gemini_api_url, GeminiBackend, DEFAULT_GEMINI_TIMEOUT},
        local::{OllamaBackend, DEFAULT_OLLAMA_TIMEOUT, DEFAULT_OLLAMA_URL},
        CompletionBackend,
    },
    types::ProviderConfig,
};
use std::time::Duration;
use tracing::info;

/// The environment variable consulted when a Gemini provider has no inline key.
pub const API_KEY_ENV_VAR: &str = "AI_API_KEY";

/// Creates a completion backend from a provider configuration.
///
/// - `"gemini"`: the API URL is derived from the model name unless given, and
///   the key comes from the config or the `AI_API_KEY` environment variable.
/// - `"local"`: an Ollama server, defaulting to `http://localhost:11434`.
pub fn create_backend(config: &ProviderConfig) -> Result<Box<dyn CompletionBackend>, ExtractError> {
    let backend: Box<dyn CompletionBackend> = match config.provider.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .or_else(|| std::env::var(API_KEY_ENV_VAR).ok())
                .ok_or_else(|| {
                    ExtractError::AuthFailure(format!(
                        "{API_KEY_ENV_VAR} must be set to use Gemini models."
                    ))
                })?;
            let api_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| gemini_api_url(&config.model_name));
            let timeout = config
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_GEMINI_TIMEOUT);
            info!("Configuring Gemini backend with URL: {}", api_url);
            Box::new(GeminiBackend::new(api_url, api_key, timeout)?)
        }
        "local" => {
            let api_url = config.api_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL);
            let timeout = config
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_OLLAMA_TIMEOUT);
            info!(
                "Configuring Ollama backend with URL: {} (model '{}')",
                api_url, config.model_name
            );
            Box::new(OllamaBackend::new(
                api_url,
                config.model_name.clone(),
                timeout,
            )?)
        }
        other => {
            return Err(ExtractError::MissingProvider(format!(
                "Unsupported provider type '{other}'. Expected 'gemini' or 'local'."
            )))
        }
    };

    Ok(backend)
}
