//! Application settings management

use crate::PathManager;
use serde::{Deserialize, Serialize};
use std::fs;

/// Environment variable holding the completion endpoint credential.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Application settings stored in settings.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// API key for the completion endpoint (the environment variable wins)
    pub api_key: Option<String>,
    /// Model ID (e.g., "deepseek/deepseek-chat-v3-0324:free")
    pub model: Option<String>,
    /// Base URL for the completion endpoint
    pub base_url: Option<String>,
    /// Path to the Whisper GGML model used for voice input
    pub whisper_model: Option<String>,
}

impl Settings {
    /// Load settings from the settings file, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = PathManager::settings_path() else {
            return Self::default();
        };

        let Ok(content) = fs::read_to_string(&path) else {
            return Self::default();
        };

        toml::from_str(&content).unwrap_or_default()
    }

    /// Save settings to the settings file
    pub fn save(&self) -> anyhow::Result<()> {
        let path = PathManager::settings_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine settings path"))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

/// Resolve the completion endpoint credential.
///
/// The environment variable (typically via a .env file) takes precedence
/// over the settings file. A missing key is fatal at startup: the client
/// cannot authenticate a single request without it.
pub fn resolve_api_key(settings: &Settings) -> anyhow::Result<String> {
    resolve_from(std::env::var(API_KEY_ENV).ok(), settings)
}

fn resolve_from(env_value: Option<String>, settings: &Settings) -> anyhow::Result<String> {
    env_value
        .filter(|k| !k.trim().is_empty())
        .or_else(|| settings.api_key.clone())
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured. Set {} (environment or .env file) or add api_key to {}",
                API_KEY_ENV,
                PathManager::settings_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "settings.toml".to_string())
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_parse() {
        let settings: Settings = toml::from_str(
            r#"
            api_key = "sk-or-v1-abc"
            model = "deepseek/deepseek-chat-v3-0324:free"
            base_url = "https://openrouter.ai/api/v1"
            "#,
        )
        .unwrap();

        assert_eq!(settings.api_key.as_deref(), Some("sk-or-v1-abc"));
        assert_eq!(
            settings.model.as_deref(),
            Some("deepseek/deepseek-chat-v3-0324:free")
        );
        assert!(settings.whisper_model.is_none());
    }

    #[test]
    fn test_empty_settings_default() {
        let settings: Settings = toml::from_str("").unwrap();
        assert!(settings.api_key.is_none());
        assert!(settings.base_url.is_none());
    }

    #[test]
    fn test_env_wins_over_settings() {
        let settings = Settings {
            api_key: Some("from-file".to_string()),
            ..Default::default()
        };
        let key = resolve_from(Some("from-env".to_string()), &settings).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn test_settings_used_when_env_absent() {
        let settings = Settings {
            api_key: Some("from-file".to_string()),
            ..Default::default()
        };
        let key = resolve_from(None, &settings).unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn test_blank_env_value_ignored() {
        let settings = Settings {
            api_key: Some("from-file".to_string()),
            ..Default::default()
        };
        let key = resolve_from(Some("  ".to_string()), &settings).unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = resolve_from(None, &Settings::default()).unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }
}
