use thiserror::Error;

/// Failure of a single engine call.
///
/// Transient failures are retried on the same engine; permanent ones move
/// straight to the next engine in the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{0}")]
    Transient(String),

    #[error("{0}")]
    Permanent(String),
}

impl EngineError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Classify a transport failure.
    ///
    /// Timeouts, connection failures, and broken or undecodable bodies are
    /// transient. Builder, redirect, and status errors are permanent.
    pub fn from_reqwest(engine: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() || e.is_decode() {
            Self::Transient(format!("{engine} request failed: {e}"))
        } else {
            Self::Permanent(format!("{engine} request failed: {e}"))
        }
    }

    /// An upstream rejection (non-success HTTP status).
    pub fn from_status(engine: &str, status: reqwest::StatusCode, body: &str) -> Self {
        let body = babel_core::text::truncate_chars(body.trim(), 200);
        Self::Permanent(format!("{engine} returned {status}: {body}"))
    }

    /// A payload that parsed but did not carry what we need, or did not parse.
    pub fn malformed(engine: &str, detail: impl std::fmt::Display) -> Self {
        Self::Permanent(format!("{engine}: malformed response: {detail}"))
    }
}
