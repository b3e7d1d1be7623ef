//! Test doubles shared by the binary's unit tests.

use async_trait::async_trait;
use babel_core::{
    config::{Config, EnginesConfig},
    error::BabelError,
    message::{IncomingMessage, MessageRef, TextFormat},
    settings::Settings,
    traits::Channel,
};
use babel_engines::{ClientRegistry, EngineError, EngineRef, Invoke};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::context::AppContext;

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Context over a fresh data directory with zero composer delays.
pub fn test_context(invoker: ScriptedInvoker) -> AppContext {
    let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "__babel_app_test_{}_{}__",
        std::process::id(),
        id
    ));
    let _ = std::fs::remove_dir_all(&dir);

    let mut config = Config::default();
    config.babel.data_dir = dir.to_string_lossy().to_string();
    config.composer.revert_delay_secs = 0;
    config.composer.cleanup_delay_secs = 0;
    config.search.enabled = false;

    let registry = Arc::new(ClientRegistry::new(&EnginesConfig::default()).unwrap());
    AppContext::with_invoker(config, registry, Arc::new(invoker))
}

/// An operator message in chat 1.
pub fn incoming(message_id: i64, text: &str) -> IncomingMessage {
    IncomingMessage {
        channel: "recording".into(),
        chat_id: 1,
        message_id,
        sender_id: 7,
        text: text.into(),
        timestamp: chrono::Utc::now(),
        reply_to: None,
        business_connection_id: None,
    }
}

/// Same as [`incoming`], replying to `reply_to` with text `quoted`.
pub fn incoming_reply(message_id: i64, text: &str, reply_to: i64, quoted: &str) -> IncomingMessage {
    let mut msg = incoming(message_id, text);
    msg.reply_to = Some(babel_core::message::ReplyContext {
        message_id: reply_to,
        text: Some(quoted.into()),
    });
    msg
}

/// Invoker with canned answers per target language or engine. Anything not
/// scripted translates to `"[target] text"`.
#[derive(Default)]
pub struct ScriptedInvoker {
    by_target: HashMap<String, Result<String, EngineError>>,
    by_engine: HashMap<String, Result<String, EngineError>>,
    completion: Option<Result<String, EngineError>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedInvoker {
    pub fn on(mut self, engine: &str, outcome: Result<&str, EngineError>) -> Self {
        self.by_engine
            .insert(engine.to_string(), outcome.map(str::to_string));
        self
    }

    pub fn on_target(mut self, target: &str, outcome: Result<&str, EngineError>) -> Self {
        self.by_target
            .insert(target.to_string(), outcome.map(str::to_string));
        self
    }

    pub fn fail_all_for_target(self, target: &str) -> Self {
        self.on_target(
            target,
            Err(EngineError::Permanent(format!("{target} unavailable"))),
        )
    }

    pub fn completing(mut self, outcome: Result<&str, EngineError>) -> Self {
        self.completion = Some(outcome.map(str::to_string));
        self
    }

    /// Handle to the `engine:target` call log.
    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Invoke for ScriptedInvoker {
    async fn invoke(
        &self,
        text: &str,
        target: &str,
        engine: &EngineRef,
        _settings: &Settings,
    ) -> Result<String, EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{target}", engine.name()));
        if let Some(outcome) = self.by_target.get(target) {
            return outcome.clone();
        }
        if let Some(outcome) = self.by_engine.get(engine.name()) {
            return outcome.clone();
        }
        Ok(format!("[{target}] {text}"))
    }

    async fn complete(
        &self,
        engine: &EngineRef,
        _prompt: &str,
        _temperature: f32,
        _settings: &Settings,
    ) -> Result<String, EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:complete", engine.name()));
        self.completion
            .clone()
            .unwrap_or_else(|| Err(EngineError::Permanent("no completion scripted".into())))
    }
}

/// Channel that records every call.
#[derive(Default)]
pub struct RecordingChannel {
    edits: Mutex<Vec<(MessageRef, String, TextFormat)>>,
    attempts: Mutex<Vec<String>>,
    deleted: Mutex<Vec<MessageRef>>,
    fail_edits_after: Option<usize>,
    fail_deletes: bool,
}

impl RecordingChannel {
    pub fn message(message_id: i64) -> MessageRef {
        MessageRef {
            chat_id: 1,
            message_id,
            business_connection_id: None,
        }
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Default::default()
        }
    }

    /// Edits succeed `n` times, then fail.
    pub fn failing_edits_after(n: usize) -> Self {
        Self {
            fail_edits_after: Some(n),
            ..Default::default()
        }
    }

    /// Texts of the successful edits, in order.
    pub fn edit_texts(&self) -> Vec<String> {
        self.edits
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text, _)| text.clone())
            .collect()
    }

    pub fn last_edit(&self) -> Option<(MessageRef, String, TextFormat)> {
        self.edits.lock().unwrap().last().cloned()
    }

    /// Texts of every edit, including failed ones.
    pub fn edit_attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<MessageRef> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, BabelError> {
        let (_tx, rx) = tokio::sync::mpsc::channel(1);
        Ok(rx)
    }

    async fn working_message(&self, incoming: &IncomingMessage) -> Result<MessageRef, BabelError> {
        Ok(incoming.message_ref())
    }

    async fn edit(
        &self,
        message: &MessageRef,
        text: &str,
        format: TextFormat,
    ) -> Result<(), BabelError> {
        let mut attempts = self.attempts.lock().unwrap();
        attempts.push(text.to_string());
        if self.fail_edits_after.is_some_and(|n| attempts.len() > n) {
            return Err(BabelError::Channel("message to edit not found".into()));
        }
        self.edits
            .lock()
            .unwrap()
            .push((message.clone(), text.to_string(), format));
        Ok(())
    }

    async fn delete(&self, message: &MessageRef) -> Result<(), BabelError> {
        if self.fail_deletes {
            return Err(BabelError::Channel("message can't be deleted".into()));
        }
        self.deleted.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn stop(&self) -> Result<(), BabelError> {
        Ok(())
    }
}
