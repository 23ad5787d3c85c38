use crate::errors::ExtractError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The result of a single completion call.
pub type CompletionResult = Result<String, ExtractError>;

/// The plain text extracted from one input file.
///
/// A `Document` is produced once by a [`DocumentLoader`](crate::loader::DocumentLoader)
/// and consumed by the pipeline run that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
    pub page_count: usize,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, text: String, page_count: usize) -> Self {
        Self {
            path: path.into(),
            text,
            page_count,
        }
    }

    /// Number of characters (not bytes) in the extracted text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Sampling options forwarded to a completion backend.
///
/// Field extraction must be reproducible, so the only accepted
/// configurations are a zero temperature with a narrow nucleus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    /// Context window size hint, consumed by local backends only.
    #[serde(default)]
    pub num_ctx: Option<u32>,
}

impl GenerationOptions {
    /// The largest `top_p` still considered deterministic.
    pub const MAX_DETERMINISTIC_TOP_P: f32 = 0.1;

    pub fn deterministic() -> Self {
        Self {
            temperature: 0.0,
            top_p: Self::MAX_DETERMINISTIC_TOP_P,
            num_ctx: None,
        }
    }

    pub fn is_deterministic(&self) -> bool {
        self.temperature == 0.0
            && self.top_p >= 0.0
            && self.top_p <= Self::MAX_DETERMINISTIC_TOP_P
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::deterministic()
    }
}

/// Per-run options for [`ExtractionPipeline`](crate::pipeline::ExtractionPipeline).
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    /// The instruction template; see [`render_prompt`](crate::prompts::core::render_prompt).
    pub template: String,
    pub generation: GenerationOptions,
    /// Maximum number of document characters included in the prompt.
    pub max_chars: usize,
}

impl ExtractionOptions {
    /// The default truncation limit, in characters.
    pub const DEFAULT_MAX_CHARS: usize = 15_000;

    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            generation: GenerationOptions::deterministic(),
            max_chars: Self::DEFAULT_MAX_CHARS,
        }
    }
}

/// A reusable configuration for a specific completion provider instance.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    /// The type of provider ("gemini" or "local").
    pub provider: String,
    /// The API URL. Optional for providers where it can be derived.
    #[serde(default)]
    pub api_url: Option<String>,
    /// The API key, which is null for local providers.
    #[serde(default)]
    pub api_key: Option<String>,
    pub model_name: String,
    /// Request timeout in seconds. Falls back to a per-provider default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}
