//! Configuration types for chatrelay.
//!
//! `RelayConfig` represents the `config.toml` in the data directory that
//! controls the listener, the store bootstrap policy, and the completion
//! gateway. Every field has a default matching the reference server.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// What happens to existing history when the message store opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapPolicy {
    /// Discard all prior messages and restart id allocation.
    Fresh,
    /// Keep history across restarts.
    #[default]
    Persistent,
}

impl fmt::Display for BootstrapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapPolicy::Fresh => write!(f, "fresh"),
            BootstrapPolicy::Persistent => write!(f, "persistent"),
        }
    }
}

impl FromStr for BootstrapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fresh" => Ok(BootstrapPolicy::Fresh),
            "persistent" => Ok(BootstrapPolicy::Persistent),
            other => Err(format!("invalid bootstrap policy: '{other}'")),
        }
    }
}

/// Top-level configuration for the relay.
///
/// Loaded from `~/.chatrelay/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub bootstrap: BootstrapPolicy,

    /// Directory holding the browser UI, served for non-API paths if present.
    #[serde(default = "default_web_dir")]
    pub web_dir: String,

    #[serde(default)]
    pub completion: CompletionConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_web_dir() -> String {
    "public".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bootstrap: BootstrapPolicy::default(),
            web_dir: default_web_dir(),
            completion: CompletionConfig::default(),
        }
    }
}

/// Tunables for the completion gateway request.
///
/// The API key is deliberately absent: it comes from the environment only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on a single completion call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.8
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_prompt: default_system_prompt(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            base_url: default_base_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_config_default_values() {
        let config = RelayConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.bootstrap, BootstrapPolicy::Persistent);
        assert_eq!(config.completion.model, "gpt-3.5-turbo");
        assert_eq!(config.completion.max_tokens, 150);
        assert_eq!(config.completion.timeout_secs, 30);
    }

    #[test]
    fn test_relay_config_deserialize_with_defaults() {
        let config: RelayConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.web_dir, "public");
        assert_eq!(config.completion.system_prompt, "You are a helpful assistant.");
    }

    #[test]
    fn test_relay_config_deserialize_with_values() {
        let toml_str = r#"
port = 8080
bootstrap = "fresh"

[completion]
model = "gpt-4o-mini"
timeout_secs = 5
"#;
        let config: RelayConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bootstrap, BootstrapPolicy::Fresh);
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.completion.timeout_secs, 5);
        // Unset fields in a present table still default.
        assert_eq!(config.completion.max_tokens, 150);
    }

    #[test]
    fn test_bootstrap_policy_roundtrip() {
        for policy in [BootstrapPolicy::Fresh, BootstrapPolicy::Persistent] {
            let parsed: BootstrapPolicy = policy.to_string().parse().unwrap();
            assert_eq!(policy, parsed);
        }
        assert!("wipe".parse::<BootstrapPolicy>().is_err());
    }
}
