//! Shared state built once at startup and handed to every request.

use babel_core::{config::Config, language::LanguageDetector, settings::SettingsStore};
use babel_engines::{ClientRegistry, EngineInvoker, Invoke, Translator};
use babel_search::SearchClient;
use babel_vocab::VocabStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::pending::PendingPrompts;

pub struct AppContext {
    pub config: Config,
    pub settings: Arc<SettingsStore>,
    pub detector: Arc<LanguageDetector>,
    pub registry: Arc<ClientRegistry>,
    pub invoker: Arc<dyn Invoke>,
    pub translator: Translator,
    pub vocab: VocabStore,
    pub search: SearchClient,
    pub pending: PendingPrompts,
    pub started: Instant,
}

impl AppContext {
    /// Build the production context from the boot configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let registry = Arc::new(ClientRegistry::new(&config.engines)?);
        let invoker: Arc<dyn Invoke> = Arc::new(EngineInvoker::new(Arc::clone(&registry)));
        Ok(Self::with_invoker(config, registry, invoker))
    }

    /// Build a context around an arbitrary invoker.
    pub fn with_invoker(
        config: Config,
        registry: Arc<ClientRegistry>,
        invoker: Arc<dyn Invoke>,
    ) -> Self {
        let settings = Arc::new(SettingsStore::new(config.babel.settings_path()));
        let translator = Translator::new(Arc::clone(&invoker), Arc::clone(&settings));
        let vocab = VocabStore::open(config.babel.vocab_path());
        let search = SearchClient::new(registry.http().clone(), config.search.clone());
        Self {
            settings,
            detector: Arc::new(LanguageDetector::new()),
            registry,
            invoker,
            translator,
            vocab,
            search,
            pending: PendingPrompts::default(),
            started: Instant::now(),
            config,
        }
    }

    /// How long a partially failed translation stays visible.
    pub fn revert_delay(&self) -> Duration {
        Duration::from_secs(self.config.composer.revert_delay_secs)
    }

    /// How long an error annotation stays before it is deleted.
    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.config.composer.cleanup_delay_secs)
    }
}
