//! Configuration for the OpenAI-compatible completion gateway.

use std::time::Duration;

use chatrelay_types::config::CompletionConfig;
use secrecy::SecretString;

/// Everything needed to construct an [`super::OpenAiCompletionGateway`].
///
/// `api_key` is `None` when no credential was found; the gateway is still
/// constructed and reports itself unavailable.
pub struct OpenAiCompatConfig {
    /// Human-readable provider name used in logs and /health.
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound on one completion call.
    pub timeout: Duration,
}

impl OpenAiCompatConfig {
    /// Build from the relay's completion settings and a resolved credential.
    pub fn from_settings(settings: &CompletionConfig, api_key: Option<SecretString>) -> Self {
        Self {
            provider_name: "openai".into(),
            base_url: settings.base_url.clone(),
            api_key,
            model: settings.model.clone(),
            system_prompt: settings.system_prompt.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}
