//! OpenAI-compatible chat completions client.
//!
//! Serves the built-in `openai` engine and every custom engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::EngineError;

/// Chat completions client bound to one endpoint and credential.
pub struct OpenAiClient {
    client: reqwest::Client,
    label: String,
    base_url: String,
    api_key: String,
    timeout: Option<Duration>,
}

impl OpenAiClient {
    /// `label` names the engine in errors and logs.
    pub fn new(client: reqwest::Client, label: &str, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            label: label.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: None,
        }
    }

    /// Override the pool's default request timeout for this client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Single-turn completion; returns the trimmed content of the first choice.
    pub async fn chat(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, EngineError> {
        let body = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("{}: POST {url} model={model}", self.label);

        let mut req = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest(&self.label, e))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| EngineError::from_reqwest(&self.label, e))?;
        if !status.is_success() {
            return Err(EngineError::from_status(&self.label, status, &text));
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| EngineError::malformed(&self.label, e))?;
        parsed
            .first_content()
            .ok_or_else(|| EngineError::malformed(&self.label, "no choices"))
    }
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

impl ChatCompletionResponse {
    fn first_content(&self) -> Option<String> {
        let content = self
            .choices
            .as_ref()?
            .first()?
            .message
            .as_ref()?
            .content
            .as_deref()?
            .trim();
        (!content.is_empty()).then(|| content.to_string())
    }
}
