//! Prompts waiting for the operator's reply: review cards and quizzes.

use babel_core::message::MessageRef;
use babel_vocab::QuizQuestion;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

const CAPACITY: usize = 32;

/// What a prompt message is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// A review card; a `1`–`5` reply grades the word.
    Review { word_id: i64 },
    /// A quiz; a reply of option letters grades every question.
    Quiz { questions: Vec<QuizQuestion> },
}

/// Prompts keyed by the message that shows them. Old prompts fall out once
/// the capacity is reached.
pub struct PendingPrompts {
    inner: Mutex<LruCache<(i64, i64), Prompt>>,
}

impl Default for PendingPrompts {
    fn default() -> Self {
        let cap = NonZeroUsize::new(CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }
}

impl PendingPrompts {
    pub fn insert(&self, message: &MessageRef, prompt: Prompt) {
        self.lock().put((message.chat_id, message.message_id), prompt);
    }

    /// Remove and return the prompt shown by `message_id`.
    pub fn take(&self, chat_id: i64, message_id: i64) -> Option<Prompt> {
        self.lock().pop(&(chat_id, message_id))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<(i64, i64), Prompt>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
