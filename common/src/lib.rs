/*!
common/src/lib.rs

Shared configuration types and secret resolution for Trendpost.

This file provides:
- Config data structures (deserialized from TOML, every field defaulted)
- An async loader that layers optional config files over built-in defaults
- Secret resolution from environment variables
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Feed collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    /// Feed URLs polled each run, in order
    pub urls: Vec<String>,
    /// How many leading entries of each feed are considered
    pub entries_per_feed: usize,
    pub fetch_timeout_seconds: u64,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            urls: default_feed_urls(),
            entries_per_feed: 3,
            fetch_timeout_seconds: 10,
        }
    }
}

/// Generator (Gemini) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub api_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Explicit model name; set it to skip the model-listing call
    pub model: Option<String>,
    /// Name patterns tried against the listing, most capable first
    pub preferred_models: Vec<String>,
    /// Used when the listing fails or matches nothing
    pub fallback_model: String,
    pub timeout_seconds: u64,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            model: None,
            preferred_models: vec![
                "gemini-1.5-pro".to_string(),
                "gemini-1.5-flash".to_string(),
                "gemini-pro".to_string(),
            ],
            fallback_model: "gemini-1.5-flash".to_string(),
            timeout_seconds: 60,
            max_output_tokens: None,
            temperature: None,
        }
    }
}

/// Telegram delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_url: String,
    /// Name of the environment variable holding the bot token
    pub bot_token_env: String,
    /// Name of the environment variable holding the target chat id
    pub chat_id_env: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            chat_id_env: "TELEGRAM_CHAT_ID".to_string(),
        }
    }
}

/// Top-level application configuration (deserialized from config.toml).
/// Every section falls back to the built-in constants, so the binary runs
/// without any config file present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feeds: FeedsConfig,
    pub generator: GeneratorConfig,
    pub telegram: TelegramConfig,
}

fn default_feed_urls() -> Vec<String> {
    [
        "https://dev.to/feed/tag/frontend",
        "https://ui.toast.com/rss.xml",
        "https://betterprogramming.pub/feed",
        "https://www.smashingmagazine.com/feed",
        "https://web.dev/feed.xml",
        "https://reactjs.org/feed.xml",
        "https://nextjs.org/feed.xml",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence); keys neither
    /// file names keep their built-in defaults.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Secrets resolved once at startup, from the environment only. The config
/// file names which variable each one comes from; the values themselves
/// never appear in config.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub api_key: String,
    pub bot_token: String,
    pub chat_id: String,
}

impl Secrets {
    /// Read all required secrets. Fails on the first variable that is unset
    /// or empty, naming it, so callers can abort before any network call.
    pub fn from_env(config: &Config) -> Result<Self> {
        Ok(Self {
            api_key: require_env(&config.generator.api_key_env)?,
            bot_token: require_env(&config.telegram.bot_token_env)?,
            chat_id: require_env(&config.telegram.chat_id_env)?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => anyhow::bail!("required environment variable {} is not set", name),
    }
}
