//! Configuration loader for chatrelay.
//!
//! Reads `config.toml` from the data directory (`~/.chatrelay/` by default)
//! and deserializes it into [`RelayConfig`]. Falls back to defaults when the
//! file is missing or malformed. Environment variables override the file;
//! the API key is only ever read from the environment.

use std::path::{Path, PathBuf};

use chatrelay_types::config::RelayConfig;
use secrecy::SecretString;

/// Env var naming the data directory.
pub const DATA_DIR_ENV: &str = "CHATRELAY_DATA_DIR";
/// Env var holding the completion API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Env var overriding the completion base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
/// Env var overriding the listen port.
pub const PORT_ENV: &str = "PORT";

/// Resolve the data directory: `CHATRELAY_DATA_DIR`, else `~/.chatrelay`,
/// else `./.chatrelay`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".chatrelay");
    }

    PathBuf::from(".chatrelay")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`RelayConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> RelayConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return RelayConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return RelayConfig::default();
        }
    };

    match toml::from_str::<RelayConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            RelayConfig::default()
        }
    }
}

/// Apply environment overrides (`PORT`, `OPENAI_BASE_URL`) on top of a loaded config.
///
/// `lookup` is `|key| std::env::var(key).ok()` in production.
pub fn apply_env_overrides(
    mut config: RelayConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> RelayConfig {
    if let Some(port) = lookup(PORT_ENV) {
        match port.trim().parse::<u16>() {
            Ok(port) => config.port = port,
            Err(_) => tracing::warn!("Ignoring invalid {PORT_ENV}='{port}'"),
        }
    }

    if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.completion.base_url = base_url;
    }

    config
}

/// Read the completion API key. An empty value counts as absent.
pub fn resolve_api_key(lookup: impl Fn(&str) -> Option<String>) -> Option<SecretString> {
    lookup(API_KEY_ENV)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}
