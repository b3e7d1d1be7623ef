//! Engine Invoker: one call to one engine.

use async_trait::async_trait;
use babel_core::settings::Settings;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::{
    engine::{BuiltinLlm, EngineRef},
    error::EngineError,
    prompt::{build_prompt, TEMPERATURE},
    registry::ClientRegistry,
};

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Call a single, already resolved engine.
#[async_trait]
pub trait Invoke: Send + Sync {
    /// Translate `text` into `target`.
    async fn invoke(
        &self,
        text: &str,
        target: &str,
        engine: &EngineRef,
        settings: &Settings,
    ) -> Result<String, EngineError>;

    /// Send a free-form prompt to an LLM engine.
    async fn complete(
        &self,
        engine: &EngineRef,
        _prompt: &str,
        _temperature: f32,
        _settings: &Settings,
    ) -> Result<String, EngineError> {
        Err(EngineError::Permanent(format!(
            "{} cannot answer free-form prompts",
            engine.name()
        )))
    }
}

/// The production invoker, backed by real HTTP clients.
pub struct EngineInvoker {
    registry: Arc<ClientRegistry>,
}

impl EngineInvoker {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }
}

#[async_trait]
impl Invoke for EngineInvoker {
    async fn invoke(
        &self,
        text: &str,
        target: &str,
        engine: &EngineRef,
        settings: &Settings,
    ) -> Result<String, EngineError> {
        let start = Instant::now();
        let result = match engine {
            EngineRef::BulkMt => self.registry.google().translate(text, target).await,
            EngineRef::Builtin(_) | EngineRef::Custom(_) => {
                let prompt = build_prompt(text, target);
                if std::env::var_os("BABEL_DEBUG").is_some() {
                    debug!("prompt for {}:\n{prompt}", engine.name());
                }
                self.complete(engine, &prompt, TEMPERATURE, settings).await
            }
        };
        if result.is_ok() {
            info!(
                "translated with {} -> {target} in {}ms",
                engine.name(),
                start.elapsed().as_millis()
            );
        }
        result
    }

    async fn complete(
        &self,
        engine: &EngineRef,
        prompt: &str,
        temperature: f32,
        settings: &Settings,
    ) -> Result<String, EngineError> {
        match engine {
            EngineRef::Builtin(BuiltinLlm::Gemini) => {
                let model = settings.model("gemini").unwrap_or(DEFAULT_GEMINI_MODEL);
                self.registry
                    .gemini(settings)?
                    .generate(model, prompt, temperature)
                    .await
            }
            EngineRef::Builtin(BuiltinLlm::OpenAi) => {
                let model = settings.model("openai").unwrap_or(DEFAULT_OPENAI_MODEL);
                self.registry
                    .openai(settings)?
                    .chat(model, prompt, temperature)
                    .await
            }
            EngineRef::Custom(name) => {
                let custom = settings
                    .custom_engine(name)
                    .ok_or_else(|| EngineError::Permanent(format!("unknown engine: {name}")))?;
                self.registry
                    .custom(name, custom)
                    .chat(&custom.model, prompt, temperature)
                    .await
            }
            EngineRef::BulkMt => Err(EngineError::Permanent(
                "google cannot answer free-form prompts".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use babel_core::config::EnginesConfig;

    fn invoker() -> EngineInvoker {
        let registry = ClientRegistry::new(&EnginesConfig::default()).unwrap();
        EngineInvoker::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_bulk_mt_cannot_complete() {
        let err = invoker()
            .complete(&EngineRef::BulkMt, "hi", 0.7, &Settings::default())
            .await
            .unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_unregistered_custom_is_permanent() {
        let err = invoker()
            .invoke("hi", "en", &EngineRef::Custom("ghost".into()), &Settings::default())
            .await
            .unwrap_err();
        assert!(!err.is_transient());
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let err = invoker()
            .invoke(
                "hi",
                "en",
                &EngineRef::Builtin(BuiltinLlm::OpenAi),
                &Settings::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Permanent("openai: no API key configured".into())
        );
    }

    #[tokio::test]
    async fn test_each_llm_variant_routes_to_its_client() {
        let inv = invoker();
        let settings = Settings::default();
        let err = inv
            .invoke("hi", "en", &EngineRef::Builtin(BuiltinLlm::Gemini), &settings)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Permanent("gemini: no API key configured".into())
        );
        let err = inv
            .invoke("hi", "en", &EngineRef::Custom("nobody".into()), &settings)
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::Permanent("unknown engine: nobody".into()));
    }
}
