//! # Backend Factory Tests
//!
//! Some of these tests read `AI_API_KEY`; a mutex keeps them from racing on
//! the process environment.

use docextract::providers::factory::{create_backend, API_KEY_ENV_VAR};
use docextract::{ExtractError, ProviderConfig};
use std::env;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn provider(kind: &str, model: &str) -> ProviderConfig {
    ProviderConfig {
        provider: kind.to_string(),
        api_url: None,
        api_key: None,
        model_name: model.to_string(),
        timeout_secs: None,
    }
}

#[test]
fn test_local_provider_builds_ollama_backend() {
    let backend = create_backend(&provider("local", "llama3.1:latest")).unwrap();
    assert_eq!(backend.name(), "ollama(llama3.1:latest)");
}

#[test]
fn test_gemini_provider_uses_inline_key() {
    let mut config = provider("gemini", "gemini-2.5-flash");
    config.api_key = Some("inline-key".to_string());
    let backend = create_backend(&config).unwrap();
    assert_eq!(backend.name(), "gemini");
}

#[test]
fn test_gemini_provider_falls_back_to_env_key() {
    let _lock = ENV_LOCK.lock().unwrap();
    env::set_var(API_KEY_ENV_VAR, "env-key");

    let result = create_backend(&provider("gemini", "gemini-2.5-flash"));

    env::remove_var(API_KEY_ENV_VAR);
    assert!(result.is_ok());
}

#[test]
fn test_gemini_provider_without_key_is_auth_failure() {
    let _lock = ENV_LOCK.lock().unwrap();
    env::remove_var(API_KEY_ENV_VAR);

    let result = create_backend(&provider("gemini", "gemini-2.5-flash"));
    assert!(matches!(result, Err(ExtractError::AuthFailure(_))));
}

#[test]
fn test_unknown_provider_type_is_rejected() {
    let result = create_backend(&provider("openai", "gpt"));
    assert!(matches!(result, Err(ExtractError::MissingProvider(msg)) if msg.contains("openai")));
}
