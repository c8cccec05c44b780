use std::env;

use anyhow::{anyhow, Result};

use crate::providers::ollama::OLLAMA_HOST;

/// Helper to read environment variables with consistent error handling.
/// Missing required values are fatal configuration errors.
pub fn get_env(key: &str, required: bool, default: Option<String>) -> Result<Option<String>> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) if !required => Ok(default),
        Err(env::VarError::NotPresent) => Err(anyhow!(
            "Environment variable '{}' is required but not set",
            key
        )),
        Err(e) => Err(e.into()),
    }
}

/// Unified enum to wrap different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    Ollama(OllamaProviderConfig),
}

impl ProviderConfig {
    /// Resolve the provider configuration from the environment.
    ///
    /// `PUNBEAM_PROVIDER` selects the provider ("openai" or "ollama"),
    /// `PUNBEAM_MODEL` names the model, `PUNBEAM_BASE_URL` the endpoint and
    /// `PUNBEAM_API_KEY` the credential (required for openai only).
    pub fn from_env() -> Result<Self> {
        let provider = get_env("PUNBEAM_PROVIDER", true, None)?
            .unwrap_or_default()
            .to_lowercase();

        match provider.as_str() {
            "openai" => Ok(ProviderConfig::OpenAi(OpenAiProviderConfig::from_env()?)),
            "ollama" => Ok(ProviderConfig::Ollama(OllamaProviderConfig::from_env()?)),
            other => Err(anyhow!(
                "Unknown provider '{}', expected 'openai' or 'ollama'",
                other
            )),
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::OpenAi(config) => &config.model,
            ProviderConfig::Ollama(config) => &config.model,
        }
    }

    pub fn host(&self) -> &str {
        match self {
            ProviderConfig::OpenAi(config) => &config.host,
            ProviderConfig::Ollama(config) => &config.host,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl OpenAiProviderConfig {
    pub fn from_env() -> Result<Self> {
        let host = get_env(
            "PUNBEAM_BASE_URL",
            false,
            Some("https://api.openai.com".to_string()),
        )?
        .unwrap_or_default();
        let api_key = get_env("PUNBEAM_API_KEY", true, None)?.unwrap_or_default();
        let model = get_env("PUNBEAM_MODEL", true, None)?.unwrap_or_default();

        Ok(Self {
            host,
            api_key,
            model,
            temperature: None,
            max_tokens: None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct OllamaProviderConfig {
    pub host: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl OllamaProviderConfig {
    pub fn from_env() -> Result<Self> {
        let host = get_env("PUNBEAM_BASE_URL", false, Some(OLLAMA_HOST.to_string()))?
            .unwrap_or_default();
        let model = get_env("PUNBEAM_MODEL", true, None)?.unwrap_or_default();

        Ok(Self {
            host,
            model,
            temperature: None,
            max_tokens: None,
        })
    }
}
