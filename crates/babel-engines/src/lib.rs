//! # babel-engines
//!
//! Translation engine implementations for Babel.
//!
//! Built-in engines:
//! - `gemini`: Google Gemini `generateContent`
//! - `openai`: OpenAI chat completions
//! - `google`: keyless Google Translate web endpoint (bulk MT)
//!
//! Any number of OpenAI-compatible custom engines can be registered at runtime.
//! [`Translator`] wraps an [`Invoke`] implementation with retry and
//! cross-engine fallback.

pub mod engine;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod google;
pub mod invoker;
pub mod openai;
pub mod prompt;
pub mod registry;
pub mod retry;

pub use engine::{candidates, BuiltinLlm, EngineRef};
pub use error::EngineError;
pub use fallback::{is_failure, Translator, FAILURE_MARKER};
pub use invoker::{EngineInvoker, Invoke};
pub use registry::ClientRegistry;
pub use retry::RetryPolicy;
