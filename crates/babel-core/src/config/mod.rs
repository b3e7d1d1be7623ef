mod channels;
mod defaults;

#[cfg(test)]
mod tests;

pub use channels::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::BabelError;
use defaults::*;

/// Top-level boot configuration, read once from `config.toml`.
///
/// Everything the operator changes at runtime through chat commands lives in
/// [`crate::settings::Settings`] instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub babel: BabelConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub engines: EnginesConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub composer: ComposerConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BabelConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BabelConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl BabelConfig {
    /// Expanded data directory.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand(&self.data_dir))
    }

    /// Path of the runtime settings file.
    pub fn settings_path(&self) -> PathBuf {
        self.data_path().join("settings.json")
    }

    /// Path of the vocabulary file.
    pub fn vocab_path(&self) -> PathBuf {
        self.data_path().join("vocab.json")
    }

    /// Directory for rolling log files.
    pub fn logs_path(&self) -> PathBuf {
        self.data_path().join("logs")
    }
}

/// Translation engine transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnginesConfig {
    /// Request timeout for built-in engines.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Request timeout for user-registered custom engines.
    #[serde(default = "default_custom_timeout_secs")]
    pub custom_timeout_secs: u64,
    /// Upper bound on idle pooled connections per host.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Used when the settings file carries no OpenAI key.
    #[serde(default)]
    pub fallback_openai_key: String,
    /// Used when the settings file carries no Gemini key.
    #[serde(default)]
    pub fallback_gemini_key: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_google_base_url")]
    pub google_base_url: String,
}

impl Default for EnginesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            custom_timeout_secs: default_custom_timeout_secs(),
            max_connections: default_max_connections(),
            fallback_openai_key: String::new(),
            fallback_gemini_key: String::new(),
            gemini_base_url: default_gemini_base_url(),
            openai_base_url: default_openai_base_url(),
            google_base_url: default_google_base_url(),
        }
    }
}

impl EnginesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn custom_timeout(&self) -> Duration {
        Duration::from_secs(self.custom_timeout_secs)
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub tavily_api_key: String,
    /// Minimum gap between two outbound searches.
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First rate-limit backoff; doubled on every further attempt.
    #[serde(default = "default_initial_retry_delay_secs")]
    pub initial_retry_delay_secs: u64,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tavily_api_key: String::new(),
            min_interval_secs: default_min_interval_secs(),
            max_retries: default_max_retries(),
            initial_retry_delay_secs: default_initial_retry_delay_secs(),
            cooldown_secs: default_cooldown_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Message composition timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// How long a partially failed translation stays visible before reverting.
    #[serde(default = "default_revert_delay_secs")]
    pub revert_delay_secs: u64,
    /// How long an error annotation stays visible before the message is deleted.
    #[serde(default = "default_cleanup_delay_secs")]
    pub cleanup_delay_secs: u64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            revert_delay_secs: default_revert_delay_secs(),
            cleanup_delay_secs: default_cleanup_delay_secs(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. Empty secrets are
/// filled from the environment afterwards.
pub fn load(path: &str) -> Result<Config, BabelError> {
    let path = Path::new(path);
    let mut config = if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    } else {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BabelError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| BabelError::Config(format!("failed to parse config: {}", e)))?
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Fill empty secrets from the environment.
fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
    fn fill(slot: &mut String, value: Option<String>) {
        if slot.is_empty() {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                *slot = v;
            }
        }
    }

    if let Some(token) = env("TELEGRAM_BOT_TOKEN").filter(|v| !v.is_empty()) {
        let tg = config
            .channel
            .telegram
            .get_or_insert_with(|| TelegramConfig {
                enabled: true,
                bot_token: String::new(),
                owner_id: 0,
            });
        fill(&mut tg.bot_token, Some(token));
    }
    fill(
        &mut config.engines.fallback_openai_key,
        env("FALLBACK_OPENAI_KEY"),
    );
    fill(
        &mut config.engines.fallback_gemini_key,
        env("FALLBACK_GEMINI_KEY"),
    );
    fill(&mut config.search.tavily_api_key, env("TAVILY_API_KEY"));
}
