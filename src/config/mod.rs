use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Backend the original deployment talks to
pub const DEFAULT_BASE_URL: &str = "http://localhost:5096";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scheme, host and port of the PersonalDetails API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout; requests wait indefinitely when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Show desktop notifications for successful saves and deletes
    #[serde(default)]
    pub notifications: bool,

    /// kitty.conf-style color file to theme the UI with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
            notifications: false,
            theme_file: None,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("persondesk");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            // Keep a broken file around for the user to fix
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save() {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(content)?;
        config.base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if config.base_url.is_empty() {
            config.base_url = default_base_url();
        }
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            base_url: "http://api.internal:8080".to_string(),
            request_timeout_secs: Some(10),
            notifications: true,
            theme_file: Some(PathBuf::from("/tmp/kitty.conf")),
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized = AppConfig::parse(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config = AppConfig::parse("notifications = true\n").unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.notifications);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let config = AppConfig::parse("base_url = \" http://localhost:9000/ \"\n").unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");

        let config = AppConfig::parse("base_url = \"\"\n").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = AppConfig {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.request_timeout().is_none());
    }
}
