use crate::{
    errors::ExtractError,
    providers::ai::{map_transport_error, CompletionBackend},
    types::{CompletionResult, GenerationOptions},
};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The address of an Ollama server running with its default settings.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// The model pulled by a stock Ollama install.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:latest";
/// Context window requested when the caller does not specify one.
pub const DEFAULT_NUM_CTX: u32 = 4096;
/// Local inference over a multi-thousand character prompt can take minutes.
pub const DEFAULT_OLLAMA_TIMEOUT: Duration = Duration::from_secs(300);

const GENERATE_PATH: &str = "/api/generate";

// --- Ollama-specific request and response structures ---

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    num_ctx: u32,
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize, Debug)]
struct OllamaErrorBody {
    error: String,
}

// --- Ollama backend implementation ---

/// A backend for a locally hosted Ollama inference server.
///
/// Requests use the non-streaming `/api/generate` mode, so the whole
/// completion arrives in a single response body.
#[derive(Clone, Debug)]
pub struct OllamaBackend {
    client: ReqwestClient,
    api_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaBackend {
    /// Creates a new `OllamaBackend`.
    ///
    /// `base_url` may be either the server root (`http://localhost:11434`) or
    /// the full generate endpoint.
    pub fn new(base_url: &str, model: String, timeout: Duration) -> Result<Self, ExtractError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ExtractError::ClientBuild)?;
        Ok(Self {
            client,
            api_url: generate_url(base_url),
            model,
            timeout,
        })
    }

    /// Turns a non-200 response into the matching error.
    fn classify_failure(status: StatusCode, body: String) -> ExtractError {
        let detail = serde_json::from_str::<OllamaErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.clone());

        if let Some(model) = missing_model_name(&body) {
            return ExtractError::ModelNotFound { model, detail };
        }

        ExtractError::UpstreamFailure {
            status: status.as_u16(),
            message: detail,
        }
    }
}

fn generate_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with(GENERATE_PATH) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{GENERATE_PATH}")
    }
}

/// Ollama reports an unknown model as `model '<name>' not found`; returns `<name>`.
fn missing_model_name(body: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"model '(?P<name>[^']+)' not found").expect("static regex is valid")
    });
    re.captures(body).map(|caps| caps["name"].to_string())
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    /// Generates a completion using the local Ollama server.
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> CompletionResult {
        let request_body = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                top_p: options.top_p,
                num_ctx: options.num_ctx.unwrap_or(DEFAULT_NUM_CTX),
            },
        };

        info!(
            "Calling Ollama ({}) at {}, please wait...",
            self.model, self.api_url
        );
        info!(
            temperature = options.temperature,
            top_p = options.top_p,
            "Using generation options"
        );

        let response = self
            .client
            .post(&self.api_url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, &self.api_url, self.timeout))?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %error_text, "Ollama call failed");
            return Err(Self::classify_failure(status, error_text));
        }

        let ollama_response: OllamaResponse =
            response
                .json()
                .await
                .map_err(|e| ExtractError::UpstreamFailure {
                    status: status.as_u16(),
                    message: format!("Failed to deserialize Ollama response: {e}"),
                })?;

        debug!("<-- Completion from Ollama: {}", &ollama_response.response);

        Ok(ollama_response.response.trim().to_string())
    }

    fn name(&self) -> String {
        format!("ollama({})", self.model)
    }
}
