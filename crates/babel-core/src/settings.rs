//! Runtime settings: the operator-mutable configuration persisted as JSON.
//!
//! The file is the single source of truth. Reads go through a short-lived
//! in-memory snapshot so a burst of messages does not re-read the file for
//! every request; writes update the snapshot and the file together. A reader
//! in another in-flight request may observe a snapshot up to one TTL old.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::BabelError;

/// Names of the built-in engines, in fallback order.
pub const BUILTIN_ENGINES: [&str; 3] = ["gemini", "openai", "google"];

/// Default snapshot validity.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// A user-registered OpenAI-compatible endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEngine {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

/// Operator settings.
///
/// Every field falls back to its default when missing from the file, so a
/// partially written or older file still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default foreign language for `.tr` / `.rr`.
    pub default_lang: String,
    /// Native language, used for `.tl` and swap direction.
    pub home_lang: String,
    /// Preferred engine name (lower-case).
    pub engine: String,
    /// Custom engines keyed by lower-case name.
    pub custom_engines: BTreeMap<String, CustomEngine>,
    /// Model per built-in LLM engine.
    pub models: BTreeMap<String, String>,
    /// Auto mode command without the leading dot, empty = off.
    pub auto_cmd: String,
    /// Credential per built-in LLM engine.
    pub api_keys: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_lang: "ja".to_string(),
            home_lang: "zh-CN".to_string(),
            engine: "gemini".to_string(),
            custom_engines: BTreeMap::new(),
            models: BTreeMap::from([
                ("openai".to_string(), "gpt-4o-mini".to_string()),
                ("gemini".to_string(), "gemini-1.5-flash".to_string()),
            ]),
            auto_cmd: String::new(),
            api_keys: BTreeMap::from([
                ("openai".to_string(), String::new()),
                ("gemini".to_string(), String::new()),
            ]),
        }
    }
}

impl Settings {
    /// Model configured for a built-in engine.
    pub fn model(&self, engine: &str) -> Option<&str> {
        self.models
            .get(engine)
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    }

    /// Credential configured for a built-in engine (may be empty).
    pub fn api_key(&self, engine: &str) -> &str {
        self.api_keys.get(engine).map(String::as_str).unwrap_or("")
    }

    /// Look up a custom engine by case-insensitive name.
    pub fn custom_engine(&self, name: &str) -> Option<&CustomEngine> {
        self.custom_engines.get(&name.to_lowercase())
    }

    /// Whether `name` is a built-in engine.
    pub fn is_builtin(name: &str) -> bool {
        BUILTIN_ENGINES.contains(&name.to_lowercase().as_str())
    }

    /// Whether `name` resolves to any known engine.
    pub fn knows_engine(&self, name: &str) -> bool {
        Self::is_builtin(name) || self.custom_engine(name).is_some()
    }
}

/// File-backed settings with a TTL snapshot.
pub struct SettingsStore {
    path: PathBuf,
    ttl: Duration,
    cache: Mutex<Option<(Instant, Settings)>>,
}

impl SettingsStore {
    /// Create a store backed by `path` with the default 5 s TTL.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_ttl(path, DEFAULT_TTL)
    }

    pub fn with_ttl(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings snapshot. Re-reads the file once the snapshot expires.
    pub fn get(&self) -> Settings {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((at, settings)) = cache.as_ref() {
            if at.elapsed() < self.ttl {
                return settings.clone();
            }
        }
        let settings = read_settings(&self.path);
        *cache = Some((Instant::now(), settings.clone()));
        settings
    }

    /// Mutate the settings and persist them.
    ///
    /// The in-memory snapshot is updated even if the file write fails, so the
    /// running process keeps the new value; the error is returned for logging.
    pub fn update<F>(&self, f: F) -> Result<Settings, BabelError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let mut settings = match cache.as_ref() {
            Some((at, s)) if at.elapsed() < self.ttl => s.clone(),
            _ => read_settings(&self.path),
        };
        f(&mut settings);
        *cache = Some((Instant::now(), settings.clone()));
        drop(cache);

        write_settings(&self.path, &settings)?;
        Ok(settings)
    }

    /// Set one top-level key from a JSON value.
    pub fn set(&self, key: &str, value: serde_json::Value) -> Result<Settings, BabelError> {
        let mut doc = serde_json::to_value(self.get())?;
        let obj = doc
            .as_object_mut()
            .ok_or_else(|| BabelError::Settings("settings are not an object".into()))?;
        if !obj.contains_key(key) {
            return Err(BabelError::Settings(format!("unknown settings key: {key}")));
        }
        obj.insert(key.to_string(), value);
        let next: Settings = serde_json::from_value(doc)?;
        self.update(|s| *s = next)
    }

    /// Drop the snapshot so the next read hits the file.
    #[cfg(test)]
    pub(crate) fn invalidate(&self) {
        *self.cache.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

fn read_settings(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    match std::fs::read_to_string(path)
        .map_err(BabelError::from)
        .and_then(|s| serde_json::from_str::<Settings>(&s).map_err(BabelError::from))
    {
        Ok(settings) => {
            debug!("loaded settings from {}", path.display());
            settings
        }
        Err(e) => {
            warn!("could not load settings, using defaults: {e}");
            Settings::default()
        }
    }
}

fn write_settings(path: &Path, settings: &Settings) -> Result<(), BabelError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
