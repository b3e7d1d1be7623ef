//! Engine identities and the fallback candidate order.

use babel_core::settings::{Settings, BUILTIN_ENGINES};

use crate::error::EngineError;

/// Built-in prompted LLM engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinLlm {
    Gemini,
    OpenAi,
}

impl BuiltinLlm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }
}

/// A resolved engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EngineRef {
    Builtin(BuiltinLlm),
    /// The keyless `google` machine-translation endpoint.
    BulkMt,
    /// A user-registered OpenAI-compatible engine (lower-case name).
    Custom(String),
}

impl EngineRef {
    /// Resolve a case-insensitive engine name against the current settings.
    pub fn resolve(name: &str, settings: &Settings) -> Result<Self, EngineError> {
        let key = name.trim().to_lowercase();
        match key.as_str() {
            "gemini" => Ok(Self::Builtin(BuiltinLlm::Gemini)),
            "openai" => Ok(Self::Builtin(BuiltinLlm::OpenAi)),
            "google" => Ok(Self::BulkMt),
            _ if settings.custom_engines.contains_key(&key) => Ok(Self::Custom(key)),
            _ => Err(EngineError::Permanent(format!("unknown engine: {name}"))),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(llm) => llm.name(),
            Self::BulkMt => "google",
            Self::Custom(name) => name,
        }
    }

    /// Whether this engine takes a prompt.
    pub fn is_llm(&self) -> bool {
        !matches!(self, Self::BulkMt)
    }
}

/// Ordered, de-duplicated engine names to try for one request: the preferred
/// engine, every custom engine, then the built-ins.
pub fn candidates(preferred: &str, settings: &Settings) -> Vec<String> {
    let preferred = preferred.trim().to_lowercase();
    let mut out: Vec<String> = Vec::new();
    let names = std::iter::once(preferred.as_str())
        .chain(settings.custom_engines.keys().map(String::as_str))
        .chain(BUILTIN_ENGINES);
    for name in names {
        let name = name.to_lowercase();
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
