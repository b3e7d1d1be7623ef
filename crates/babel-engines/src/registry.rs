//! Credential-scoped client handles over one shared connection pool.

use babel_core::{
    config::EnginesConfig,
    settings::{CustomEngine, Settings},
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::{error::EngineError, gemini::GeminiClient, google::GoogleTranslate, openai::OpenAiClient};

/// Lazily built provider clients, memoized per (provider, credential).
///
/// All clients share one `reqwest::Client`, so they share its pool.
pub struct ClientRegistry {
    http: reqwest::Client,
    config: EnginesConfig,
    gemini: Mutex<HashMap<String, Arc<GeminiClient>>>,
    openai: Mutex<HashMap<String, Arc<OpenAiClient>>>,
    custom: Mutex<HashMap<(String, String, String), Arc<OpenAiClient>>>,
    google: Arc<GoogleTranslate>,
}

impl ClientRegistry {
    pub fn new(config: &EnginesConfig) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(config.max_connections)
            .build()
            .map_err(|e| EngineError::Permanent(format!("failed to build http client: {e}")))?;
        let google = Arc::new(GoogleTranslate::new(http.clone(), &config.google_base_url));
        Ok(Self {
            http,
            config: config.clone(),
            gemini: Mutex::new(HashMap::new()),
            openai: Mutex::new(HashMap::new()),
            custom: Mutex::new(HashMap::new()),
            google,
        })
    }

    /// The shared HTTP client, for callers outside the translation path.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Gemini client for the credential in `settings`, or the boot fallback key.
    pub fn gemini(&self, settings: &Settings) -> Result<Arc<GeminiClient>, EngineError> {
        let key = effective_key(settings.api_key("gemini"), &self.config.fallback_gemini_key)
            .ok_or_else(|| EngineError::Permanent("gemini: no API key configured".into()))?;
        let mut map = self.gemini.lock().unwrap_or_else(|e| e.into_inner());
        let client = map.entry(key.to_string()).or_insert_with(|| {
            debug!("building gemini client");
            Arc::new(GeminiClient::new(
                self.http.clone(),
                &self.config.gemini_base_url,
                key,
            ))
        });
        Ok(Arc::clone(client))
    }

    /// OpenAI client for the credential in `settings`, or the boot fallback key.
    pub fn openai(&self, settings: &Settings) -> Result<Arc<OpenAiClient>, EngineError> {
        let key = effective_key(settings.api_key("openai"), &self.config.fallback_openai_key)
            .ok_or_else(|| EngineError::Permanent("openai: no API key configured".into()))?;
        let mut map = self.openai.lock().unwrap_or_else(|e| e.into_inner());
        let client = map.entry(key.to_string()).or_insert_with(|| {
            debug!("building openai client");
            Arc::new(OpenAiClient::new(
                self.http.clone(),
                "openai",
                &self.config.openai_base_url,
                key,
            ))
        });
        Ok(Arc::clone(client))
    }

    /// Client for a custom engine. Editing the engine's endpoint or key yields a new handle.
    pub fn custom(&self, name: &str, engine: &CustomEngine) -> Arc<OpenAiClient> {
        let cache_key = (
            name.to_lowercase(),
            engine.base_url.clone(),
            engine.api_key.clone(),
        );
        let mut map = self.custom.lock().unwrap_or_else(|e| e.into_inner());
        let client = map.entry(cache_key).or_insert_with(|| {
            debug!("building client for custom engine {name}");
            Arc::new(
                OpenAiClient::new(self.http.clone(), name, &engine.base_url, &engine.api_key)
                    .with_timeout(self.config.custom_timeout()),
            )
        });
        Arc::clone(client)
    }

    pub fn google(&self) -> Arc<GoogleTranslate> {
        Arc::clone(&self.google)
    }

    /// Drop every memoized handle. Called whenever a credential changes.
    pub fn clear(&self) {
        self.gemini.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.openai.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.custom.lock().unwrap_or_else(|e| e.into_inner()).clear();
        info!("engine client cache cleared");
    }

    /// Number of memoized handles.
    pub fn cached(&self) -> usize {
        self.gemini.lock().unwrap_or_else(|e| e.into_inner()).len()
            + self.openai.lock().unwrap_or_else(|e| e.into_inner()).len()
            + self.custom.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn effective_key<'a>(configured: &'a str, fallback: &'a str) -> Option<&'a str> {
    [configured, fallback]
        .into_iter()
        .map(str::trim)
        .find(|k| !k.is_empty())
}
