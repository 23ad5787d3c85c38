//! # Application Configuration
//!
//! Defines the configuration for the `docextract` binary and the logic for
//! loading it from built-in defaults, an optional YAML file, and environment
//! variables, in that order of precedence (last wins).

use config::{
    Config as ConfigBuilder, Environment, File, FileFormat, Value as ConfigValue,
    ValueKind as ConfigValueKind,
};
use docextract::constants::{
    FUND_TERMS_TASK, GEMINI_DEFAULT_PROVIDER, LOCAL_DEFAULT_PROVIDER, TIMELINE_TASK,
};
use docextract::prompts::extraction::{FUND_TERMS_EXTRACTION_PROMPT, TIMELINE_EXTRACTION_PROMPT};
use docextract::providers::ai::gemini::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_TIMEOUT};
use docextract::providers::ai::local::{
    DEFAULT_NUM_CTX, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_TIMEOUT, DEFAULT_OLLAMA_URL,
};
use docextract::{ExtractionOptions, GenerationOptions, ProviderConfig};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// The file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "docextract.yml";

/// The prefix of environment variables overriding nested keys,
/// e.g. `DOCEXTRACT_TASKS__TIMELINE__MAX_CHARS`.
pub const ENV_PREFIX: &str = "DOCEXTRACT";

#[derive(Error, Debug)]
pub enum ConfigError {
    /// An error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(String),
    /// A configuration file named explicitly was not found.
    #[error("{0}")]
    NotFound(String),
    #[error("Unknown task '{name}'. Available tasks: {available}")]
    UnknownTask { name: String, available: String },
    #[error("Unknown provider '{0}'. Define it under 'providers' in the config file.")]
    UnknownProvider(String),
    #[error(
        "Generation options must be deterministic (temperature 0.0, top_p <= {max_top_p}); got temperature {temperature}, top_p {top_p}"
    )]
    NonDeterministic {
        temperature: f32,
        top_p: f32,
        max_top_p: f32,
    },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `docextract.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Sampling options shared by every task.
    pub generation: GenerationOptions,
    /// A map of named, reusable completion provider configurations.
    pub providers: HashMap<String, ProviderConfig>,
    /// A map of extraction tasks, each naming a provider and a template.
    pub tasks: HashMap<String, TaskConfig>,
}

/// One extraction task: what to ask, whom to ask, and how much text to send.
#[derive(Debug, Deserialize, Clone)]
pub struct TaskConfig {
    /// The key of the provider to use from the `providers` map.
    #[serde(default = "default_task_provider")]
    pub provider: String,
    pub template: String,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

fn default_task_provider() -> String {
    LOCAL_DEFAULT_PROVIDER.to_string()
}

fn default_max_chars() -> usize {
    ExtractionOptions::DEFAULT_MAX_CHARS
}

impl AppConfig {
    /// Looks up a task by name.
    pub fn task(&self, name: &str) -> Result<&TaskConfig, ConfigError> {
        self.tasks.get(name).ok_or_else(|| ConfigError::UnknownTask {
            name: name.to_string(),
            available: self.task_names().join(", "),
        })
    }

    /// Looks up a provider by name.
    pub fn provider(&self, name: &str) -> Result<&ProviderConfig, ConfigError> {
        self.providers
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProvider(name.to_string()))
    }

    /// Task names in a stable order, for listings and error messages.
    pub fn task_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the per-run pipeline options for `task`.
    ///
    /// `max_chars` overrides the task's own truncation limit when given.
    pub fn extraction_options(
        &self,
        task: &TaskConfig,
        max_chars: Option<usize>,
    ) -> ExtractionOptions {
        ExtractionOptions {
            template: task.template.clone(),
            generation: self.generation,
            max_chars: max_chars.unwrap_or(task.max_chars),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.generation.is_deterministic() {
            return Err(ConfigError::NonDeterministic {
                temperature: self.generation.temperature,
                top_p: self.generation.top_p,
                max_top_p: GenerationOptions::MAX_DETERMINISTIC_TOP_P,
            });
        }
        for name in self.task_names() {
            let task = &self.tasks[name];
            if !self.providers.contains_key(&task.provider) {
                return Err(ConfigError::UnknownProvider(task.provider.clone()));
            }
        }
        Ok(())
    }
}

fn table(entries: Vec<(&str, ConfigValue)>) -> ConfigValue {
    let map: HashMap<String, ConfigValue> = entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    ConfigValue::new(None, ConfigValueKind::Table(map))
}

/// The built-in extraction tasks, one per supported output format.
fn build_default_tasks() -> HashMap<String, ConfigValue> {
    let max_chars = ExtractionOptions::DEFAULT_MAX_CHARS as i64;
    vec![
        (FUND_TERMS_TASK, FUND_TERMS_EXTRACTION_PROMPT),
        (TIMELINE_TASK, TIMELINE_EXTRACTION_PROMPT),
    ]
    .into_iter()
    .map(|(name, template)| {
        (
            name.to_string(),
            table(vec![
                ("provider", ConfigValue::from(LOCAL_DEFAULT_PROVIDER)),
                ("template", ConfigValue::from(template)),
                ("max_chars", ConfigValue::from(max_chars)),
            ]),
        )
    })
    .collect()
}

/// The built-in providers: a local Ollama server and the hosted Gemini API.
///
/// The Gemini key is not part of the defaults; the backend factory reads it
/// from `AI_API_KEY` at construction time.
fn build_default_providers() -> HashMap<String, ConfigValue> {
    let mut providers = HashMap::new();
    providers.insert(
        LOCAL_DEFAULT_PROVIDER.to_string(),
        table(vec![
            ("provider", ConfigValue::from("local")),
            ("api_url", ConfigValue::from(DEFAULT_OLLAMA_URL)),
            ("model_name", ConfigValue::from(DEFAULT_OLLAMA_MODEL)),
            (
                "timeout_secs",
                ConfigValue::from(DEFAULT_OLLAMA_TIMEOUT.as_secs() as i64),
            ),
        ]),
    );
    providers.insert(
        GEMINI_DEFAULT_PROVIDER.to_string(),
        table(vec![
            ("provider", ConfigValue::from("gemini")),
            ("model_name", ConfigValue::from(DEFAULT_GEMINI_MODEL)),
            (
                "timeout_secs",
                ConfigValue::from(DEFAULT_GEMINI_TIMEOUT.as_secs() as i64),
            ),
        ]),
    );
    providers
}

fn build_default_generation() -> HashMap<String, ConfigValue> {
    let defaults = GenerationOptions::deterministic();
    let mut generation = HashMap::new();
    generation.insert(
        "temperature".to_string(),
        ConfigValue::from(defaults.temperature as f64),
    );
    generation.insert(
        "top_p".to_string(),
        ConfigValue::from(defaults.top_p as f64),
    );
    generation.insert(
        "num_ctx".to_string(),
        ConfigValue::from(DEFAULT_NUM_CTX as i64),
    );
    generation
}

// Reads a file and substitutes `${VAR}` references from the environment.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ConfigError::General(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration.
///
/// - Layer 1: built-in providers, tasks and generation options.
/// - Layer 2: `config_path_override`, or `./docextract.yml` if it exists. An
///   explicit path that does not exist is an error.
/// - Layer 3: `DOCEXTRACT_...` environment variables, with `__` separating
///   nested keys (e.g. `DOCEXTRACT_PROVIDERS__LOCAL_DEFAULT__MODEL_NAME`).
///
/// The result is rejected if its generation options are not deterministic or
/// a task names an undefined provider.
pub fn get_config(config_path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        .set_default("generation", build_default_generation())?
        .set_default("providers", build_default_providers())?
        .set_default("tasks", build_default_tasks())?;

    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{}'.", path.display()))
            })?;
            info!("Loading configuration from '{}'.", path.display());
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            if let Some(content) = read_and_substitute(Path::new(DEFAULT_CONFIG_FILE))? {
                info!("Loading configuration from '{DEFAULT_CONFIG_FILE}'.");
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            }
        }
    }

    let settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
