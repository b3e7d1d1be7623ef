//! Fallback Gateway: try each candidate engine until one translates.

use babel_core::{
    settings::{Settings, SettingsStore},
    text::truncate_chars,
};
use std::sync::Arc;
use tracing::warn;

use crate::{
    engine::{candidates, EngineRef},
    invoker::Invoke,
    retry::RetryPolicy,
};

/// Prefix of the string returned when every engine failed.
pub const FAILURE_MARKER: &str = "ERROR:";

const DIAGNOSTIC_CHARS: usize = 30;
const REPORTED_DIAGNOSTICS: usize = 2;

/// Whether a gateway result is the all-engines-failed marker.
pub fn is_failure(result: &str) -> bool {
    result.starts_with(FAILURE_MARKER)
}

/// Cross-engine translator.
pub struct Translator {
    invoker: Arc<dyn Invoke>,
    settings: Arc<SettingsStore>,
    retry: RetryPolicy,
}

impl Translator {
    pub fn new(invoker: Arc<dyn Invoke>, settings: Arc<SettingsStore>) -> Self {
        Self {
            invoker,
            settings,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Translate with the current settings snapshot. Never fails: when
    /// every engine fails the result starts with [`FAILURE_MARKER`].
    pub async fn translate_with_fallback(&self, text: &str, target: &str, preferred: &str) -> String {
        let settings = self.settings.get();
        self.translate_with_settings(text, target, preferred, &settings)
            .await
    }

    pub async fn translate_with_settings(
        &self,
        text: &str,
        target: &str,
        preferred: &str,
        settings: &Settings,
    ) -> String {
        let mut diagnostics = Vec::new();
        for name in candidates(preferred, settings) {
            let result = match EngineRef::resolve(&name, settings) {
                Ok(engine) => {
                    self.retry
                        .run(&name, || self.invoker.invoke(text, target, &engine, settings))
                        .await
                }
                Err(e) => Err(e),
            };
            match result {
                Ok(translated) => return translated,
                Err(e) => {
                    warn!("engine {name} failed for {target}: {e}");
                    let msg = e.to_string();
                    diagnostics.push(format!("{name}({})", truncate_chars(&msg, DIAGNOSTIC_CHARS)));
                }
            }
        }

        let shown: Vec<&str> = diagnostics
            .iter()
            .take(REPORTED_DIAGNOSTICS)
            .map(String::as_str)
            .collect();
        format!("{FAILURE_MARKER} {}...", shown.join(" | "))
    }
}
