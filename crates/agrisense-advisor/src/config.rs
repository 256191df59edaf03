//! Completion provider configuration
//!
//! Resolution order for [`AdvisorConfig::from_env`]:
//! 1. a JSON file named by `AGRISENSE_LLM_CONFIG`
//! 2. `GEMINI_API_KEY` (+ optional `GEMINI_MODEL`)
//! 3. `AGRISENSE_LLM_BASE_URL` + `AGRISENSE_LLM_MODEL` (+ optional `AGRISENSE_LLM_API_KEY`)
//!
//! When none of these yield a credential the advisor runs on the
//! deterministic engine alone.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::llm::CompletionClient;
use crate::providers::{GeminiClient, OpenAICompatibleClient, DEFAULT_GEMINI_MODEL};

pub const DEFAULT_TIMEOUT_SECS: u64 = 12;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const CONFIG_PATH_ENV: &str = "AGRISENSE_LLM_CONFIG";
const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";
const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";
const COMPAT_BASE_URL_ENV: &str = "AGRISENSE_LLM_BASE_URL";
const COMPAT_MODEL_ENV: &str = "AGRISENSE_LLM_MODEL";
const COMPAT_KEY_ENV: &str = "AGRISENSE_LLM_API_KEY";
const TIMEOUT_ENV: &str = "AGRISENSE_AI_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    Gemini {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        api_key_env: Option<String>,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        temperature: Option<f64>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
    #[serde(rename = "openai_compatible")]
    OpenAICompatible {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        api_key_env: Option<String>,
        base_url: String,
        model: String,
        #[serde(default)]
        temperature: Option<f64>,
        #[serde(default)]
        max_tokens: Option<u32>,
        #[serde(default)]
        headers: Option<HashMap<String, String>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub provider: Option<ProviderConfig>,
    pub timeout_secs: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            provider: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match non_empty_env(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self {
                provider: Self::provider_from_env(),
                ..Self::default()
            },
        };

        if let Some(raw) = non_empty_env(TIMEOUT_ENV) {
            match raw.parse::<u64>() {
                Ok(secs) => config.timeout_secs = secs,
                Err(_) => tracing::warn!(
                    "Ignoring {}={:?}: not a whole number of seconds",
                    TIMEOUT_ENV,
                    raw
                ),
            }
        }

        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read advisor config at {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid advisor config JSON at {:?}", path))
    }

    fn provider_from_env() -> Option<ProviderConfig> {
        if non_empty_env(GEMINI_KEY_ENV).is_some() {
            return Some(ProviderConfig::Gemini {
                api_key: None,
                api_key_env: None,
                model: None,
                temperature: None,
                max_tokens: None,
            });
        }

        match (non_empty_env(COMPAT_BASE_URL_ENV), non_empty_env(COMPAT_MODEL_ENV)) {
            (Some(base_url), Some(model)) => Some(ProviderConfig::OpenAICompatible {
                name: None,
                api_key: None,
                api_key_env: None,
                base_url,
                model,
                temperature: None,
                max_tokens: None,
                headers: None,
            }),
            _ => None,
        }
    }

    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// A zero timeout would make every attempt fail, so it is raised to one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Build the configured completion client, or `None` when no credential
    /// can be found.
    pub fn build_client(&self) -> Result<Option<Arc<dyn CompletionClient>>> {
        let Some(provider) = &self.provider else {
            tracing::info!("No completion provider configured; using the advisory engine only");
            return Ok(None);
        };

        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(self.timeout())
            .build()
            .context("Failed to build HTTP client for completion provider")?;

        let client: Arc<dyn CompletionClient> = match provider {
            ProviderConfig::Gemini {
                api_key,
                api_key_env,
                model,
                temperature,
                max_tokens,
            } => {
                let Some(api_key) = resolve_api_key(api_key, api_key_env, GEMINI_KEY_ENV) else {
                    tracing::warn!(
                        "Gemini provider configured without an API key; using the advisory engine only"
                    );
                    return Ok(None);
                };
                let model = model
                    .clone()
                    .or_else(|| non_empty_env(GEMINI_MODEL_ENV))
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
                let mut client = GeminiClient::new(api_key, model).with_http_client(http_client);
                if let Some(value) = *temperature {
                    client = client.with_temperature(value);
                }
                if let Some(value) = *max_tokens {
                    client = client.with_max_tokens(value);
                }
                Arc::new(client)
            }
            ProviderConfig::OpenAICompatible {
                name,
                api_key,
                api_key_env,
                base_url,
                model,
                temperature,
                max_tokens,
                headers,
            } => {
                if base_url.trim().is_empty() || model.trim().is_empty() {
                    anyhow::bail!("openai_compatible provider needs both base_url and model");
                }
                let api_key = resolve_api_key(api_key, api_key_env, COMPAT_KEY_ENV);
                let display_name = name
                    .clone()
                    .unwrap_or_else(|| "OpenAI-Compatible".to_string());
                let mut client =
                    OpenAICompatibleClient::new(display_name, api_key, base_url.clone(), model.clone())
                        .with_http_client(http_client);
                if let Some(value) = *temperature {
                    client = client.with_temperature(value);
                }
                if let Some(value) = *max_tokens {
                    client = client.with_max_tokens(value);
                }
                if let Some(extra_headers) = headers {
                    for (key, value) in extra_headers {
                        client = client.with_header(key.clone(), value.clone());
                    }
                }
                Arc::new(client)
            }
        };

        tracing::info!("Completion provider ready: {}", client.name());
        Ok(Some(client))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn resolve_api_key(
    explicit: &Option<String>,
    env_hint: &Option<String>,
    default_env: &str,
) -> Option<String> {
    if let Some(value) = explicit.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        return Some(value.to_string());
    }
    if let Some(value) = env_hint.as_deref().and_then(non_empty_env) {
        return Some(value);
    }
    non_empty_env(default_env)
}
