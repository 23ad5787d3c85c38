use crate::{
    errors::ExtractError,
    providers::ai::CompletionBackend,
    types::{CompletionResult, GenerationOptions},
};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::time::Duration;
use tracing::{debug, info, warn};

/// The hosted model used when a provider names none.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_TIMEOUT: Duration = Duration::from_secs(120);

/// Builds the `generateContent` endpoint for a Gemini model.
pub fn gemini_api_url(model_name: &str) -> String {
    format!("https://generativelanguage.googleapis.com/v1beta/models/{model_name}:generateContent")
}

// --- Gemini-specific request and response structures ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: ContentResponse,
}

#[derive(Deserialize, Debug, Default)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    #[serde(default)]
    text: String,
}

// --- Gemini backend implementation ---

/// A backend for the Google Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiBackend {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl Debug for GeminiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl GeminiBackend {
    /// Creates a new `GeminiBackend`.
    ///
    /// An empty API key is rejected up front as an authentication failure.
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, ExtractError> {
        if api_key.trim().is_empty() {
            return Err(ExtractError::AuthFailure(
                "Gemini API key is missing".to_string(),
            ));
        }
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ExtractError::ClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            timeout,
        })
    }

    fn classify_failure(status: StatusCode, body: String) -> ExtractError {
        let invalid_key = status == StatusCode::BAD_REQUEST
            && (body.contains("API_KEY_INVALID") || body.contains("API key not valid"));

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN || invalid_key {
            ExtractError::AuthFailure(body)
        } else {
            ExtractError::UpstreamFailure {
                status: status.as_u16(),
                message: body,
            }
        }
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    /// Generates a completion using the Gemini API.
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> CompletionResult {
        let request_body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_p: options.top_p,
            },
        };

        info!("Calling Google Gemini API ({}), please wait...", self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractError::Timeout(self.timeout)
                } else {
                    // The query string carries the key, so the URL is dropped from the message.
                    ExtractError::UpstreamFailure {
                        status: ExtractError::NO_STATUS,
                        message: e.without_url().to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gemini API call failed");
            return Err(Self::classify_failure(status, error_text));
        }

        let gemini_response: GeminiResponse =
            response
                .json()
                .await
                .map_err(|e| ExtractError::UpstreamFailure {
                    status: status.as_u16(),
                    message: format!(
                        "Failed to deserialize Gemini API response: {}",
                        e.without_url()
                    ),
                })?;

        let raw_response = gemini_response
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default();

        debug!("<-- Completion from Gemini: {}", &raw_response);

        Ok(raw_response.trim().to_string())
    }

    fn name(&self) -> String {
        "gemini".to_string()
    }
}
