use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

/// Environment variable that overrides `backend.token`.
pub const TOKEN_ENV: &str = "MEDIA_BROWSER_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Where list data comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Long-lived access token. `MEDIA_BROWSER_TOKEN` wins when set.
    #[serde(default)]
    pub token: Option<String>,
    /// Service domain the list calls live under.
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Media player entity the calls target.
    #[serde(default = "default_entity_id")]
    pub entity_id: String,
    /// Account the local cache is scoped to.
    #[serde(default = "default_account")]
    pub account: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Gesture and list behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_pointer_hold_ms")]
    pub pointer_hold_ms: u64,
    #[serde(default = "default_touch_hold_ms")]
    pub touch_hold_ms: u64,
    #[serde(default = "default_scroll_retry_ms")]
    pub scroll_retry_ms: u64,
    /// Item cap applied to every list while the dashboard is being edited.
    #[serde(default = "default_preview_item_cap")]
    pub preview_item_cap: usize,
    /// Maximum number of items requested per list.
    #[serde(default = "default_items_limit")]
    pub items_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            domain: default_domain(),
            entity_id: default_entity_id(),
            account: default_account(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            pointer_hold_ms: default_pointer_hold_ms(),
            touch_hold_ms: default_touch_hold_ms(),
            scroll_retry_ms: default_scroll_retry_ms(),
            preview_item_cap: default_preview_item_cap(),
            items_limit: default_items_limit(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_file: default_cache_file(),
        }
    }
}

fn default_base_url() -> String {
    "http://homeassistant.local:8123".to_string()
}

fn default_domain() -> String {
    "spotifyplus".to_string()
}

fn default_entity_id() -> String {
    "media_player.spotifyplus".to_string()
}

fn default_account() -> String {
    "default".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_pointer_hold_ms() -> u64 {
    1000
}

fn default_touch_hold_ms() -> u64 {
    1100
}

fn default_scroll_retry_ms() -> u64 {
    50
}

fn default_preview_item_cap() -> usize {
    25
}

fn default_items_limit() -> u32 {
    200
}

fn default_cache_file() -> PathBuf {
    platform::data_dir().join("list_cache.json")
}

impl BackendConfig {
    /// Token from the environment, falling back to the config file.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.token.clone())
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.browser.pointer_hold_ms, 1000);
        assert_eq!(config.browser.touch_hold_ms, 1100);
        assert_eq!(config.browser.scroll_retry_ms, 50);
        assert_eq!(config.browser.preview_item_cap, 25);
        assert!(config.backend.base_url.starts_with("http"));
        assert!(config.paths.cache_file.ends_with("list_cache.json"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            base_url = "http://10.0.0.2:8123"
            account = "alice"

            [browser]
            preview_item_cap = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.2:8123");
        assert_eq!(config.backend.account, "alice");
        assert_eq!(config.backend.domain, "spotifyplus");
        assert_eq!(config.browser.preview_item_cap, 10);
        assert_eq!(config.browser.touch_hold_ms, 1100);
    }
}
