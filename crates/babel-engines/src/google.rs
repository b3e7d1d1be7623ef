//! Keyless Google Translate web endpoint (the `google` engine).
//!
//! The response is a nested JSON array; the first element holds one
//! `[translated, original, ...]` entry per sentence.

use babel_core::language::normalize;
use serde_json::Value;
use tracing::debug;

use crate::error::EngineError;

pub struct GoogleTranslate {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslate {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Translate `text` into `target` with automatic source detection.
    pub async fn translate(&self, text: &str, target: &str) -> Result<String, EngineError> {
        let url = format!("{}/translate_a/single", self.base_url);
        let target = normalize(target);
        debug!("google: GET translate_a/single tl={target}");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("google", e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| EngineError::from_reqwest("google", e))?;
        if !status.is_success() {
            return Err(EngineError::from_status("google", status, &body));
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| EngineError::malformed("google", e))?;
        join_segments(&value).ok_or_else(|| EngineError::malformed("google", "no segments"))
    }
}

fn join_segments(value: &Value) -> Option<String> {
    let segments = value.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
