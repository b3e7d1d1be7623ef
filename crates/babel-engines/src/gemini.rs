//! Google Gemini client.
//!
//! Calls the `generateContent` endpoint. The key travels in the
//! `x-goog-api-key` header so it never shows up in transport errors.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;

/// Gemini client bound to one credential.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Single-turn completion; returns the trimmed text of the first candidate.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, EngineError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature },
        };

        let url = format!("{}/models/{model}:generateContent", self.base_url);
        debug!("gemini: POST models/{model}:generateContent");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("gemini", e))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| EngineError::from_reqwest("gemini", e))?;
        if !status.is_success() {
            return Err(EngineError::from_status("gemini", status, &text));
        }

        let parsed: GeminiResponse =
            serde_json::from_str(&text).map_err(|e| EngineError::malformed("gemini", e))?;
        parsed
            .first_text()
            .ok_or_else(|| EngineError::malformed("gemini", "no candidates"))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.as_ref()?.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().map(|p| p.text.as_str()).collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts: vec![GeminiPart { text: "Hi".into() }],
            }],
            generation_config: GenerationConfig { temperature: 0.8 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hi");
        assert!(json["generationConfig"]["temperature"].as_f64().unwrap() > 0.79);
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "  こんにちは \n"}]}
            }],
            "usageMetadata": {"totalTokenCount": 12}
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.first_text().as_deref(), Some("こんにちは"));
    }

    #[test]
    fn test_response_without_candidates() {
        let resp: GeminiResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert!(resp.first_text().is_none());

        let resp: GeminiResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": [{"text": " "}]}}]}"#)
                .unwrap();
        assert!(resp.first_text().is_none());
    }
}
