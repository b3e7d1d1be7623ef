//! Outbound calls: send, edit, delete, and command registration.

use super::types::{TgMessage, TgResponse};
use super::{TelegramChannel, MAX_MESSAGE_LEN};
use crate::utils::{parse_mode, split_message};
use babel_core::{
    error::BabelError,
    message::{MessageRef, TextFormat},
    text::truncate_chars,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Outcome of one Bot API call.
enum ApiOutcome {
    Ok(Value),
    /// Telegram rejected the formatting entities.
    BadEntities(String),
    Failed(String),
}

impl TelegramChannel {
    async fn call(&self, method: &str, body: &Value) -> Result<ApiOutcome, BabelError> {
        let url = format!("{}/{method}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BabelError::Channel(format!("telegram {method} failed: {e}")))?;

        let parsed: TgResponse<Value> = resp
            .json()
            .await
            .map_err(|e| BabelError::Channel(format!("telegram {method} parse failed: {e}")))?;
        if parsed.ok {
            return Ok(ApiOutcome::Ok(parsed.result.unwrap_or(Value::Null)));
        }
        let description = parsed.description.unwrap_or_default();
        if description.contains("can't parse entities") {
            Ok(ApiOutcome::BadEntities(description))
        } else {
            Ok(ApiOutcome::Failed(description))
        }
    }

    /// Call `method`, retrying once without `parse_mode` if the markup is rejected.
    async fn call_with_plain_fallback(
        &self,
        method: &str,
        mut body: Value,
    ) -> Result<Value, BabelError> {
        match self.call(method, &body).await? {
            ApiOutcome::Ok(v) => Ok(v),
            ApiOutcome::BadEntities(desc) => {
                warn!("telegram {method}: markup rejected, retrying as plain text: {desc}");
                if let Some(obj) = body.as_object_mut() {
                    obj.remove("parse_mode");
                }
                match self.call(method, &body).await? {
                    ApiOutcome::Ok(v) => Ok(v),
                    ApiOutcome::BadEntities(desc) | ApiOutcome::Failed(desc) => Err(
                        BabelError::Channel(format!("telegram {method} (plain fallback) failed: {desc}")),
                    ),
                }
            }
            ApiOutcome::Failed(desc) => {
                Err(BabelError::Channel(format!("telegram {method} failed: {desc}")))
            }
        }
    }

    /// Send text, split into chunks. Returns a handle to the last chunk.
    pub(crate) async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        format: TextFormat,
        reply_to: Option<i64>,
    ) -> Result<MessageRef, BabelError> {
        let mut last = None;
        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let body = message_body(chat_id, chunk, format, reply_to);
            let result = self.call_with_plain_fallback("sendMessage", body).await?;
            let sent: TgMessage = serde_json::from_value(result)?;
            last = Some(MessageRef {
                chat_id: sent.chat.id,
                message_id: sent.message_id,
                business_connection_id: None,
            });
        }
        last.ok_or_else(|| BabelError::Channel("telegram sendMessage: nothing sent".into()))
    }

    /// Replace a message's text. Text beyond Telegram's limit is cut.
    pub(crate) async fn edit_text(
        &self,
        message: &MessageRef,
        text: &str,
        format: TextFormat,
    ) -> Result<(), BabelError> {
        let text = truncate_chars(text, MAX_MESSAGE_LEN);
        let mut body = json!({
            "chat_id": message.chat_id,
            "message_id": message.message_id,
            "text": text,
        });
        if let Some(mode) = parse_mode(format) {
            body["parse_mode"] = json!(mode);
        }
        if let Some(conn) = &message.business_connection_id {
            body["business_connection_id"] = json!(conn);
        }
        match self.call_with_plain_fallback("editMessageText", body).await {
            Ok(_) => Ok(()),
            Err(BabelError::Channel(e)) if e.contains("message is not modified") => {
                debug!("telegram edit: message unchanged");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn delete_message(&self, message: &MessageRef) -> Result<(), BabelError> {
        let (method, body) = match &message.business_connection_id {
            Some(conn) => (
                "deleteBusinessMessages",
                json!({
                    "business_connection_id": conn,
                    "message_ids": [message.message_id],
                }),
            ),
            None => (
                "deleteMessage",
                json!({
                    "chat_id": message.chat_id,
                    "message_id": message.message_id,
                }),
            ),
        };
        match self.call(method, &body).await? {
            ApiOutcome::Ok(_) => Ok(()),
            ApiOutcome::BadEntities(desc) | ApiOutcome::Failed(desc) => Err(BabelError::Channel(
                format!("telegram {method} failed: {desc}"),
            )),
        }
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = json!({
            "commands": [
                { "command": "help", "description": "Show available commands" },
                { "command": "status", "description": "Engine, languages, auto mode, uptime" },
                { "command": "ping", "description": "Measure engine latency" },
            ]
        });
        match self.call("setMyCommands", &commands).await {
            Ok(ApiOutcome::Ok(_)) => info!("registered Telegram bot commands"),
            Ok(ApiOutcome::BadEntities(desc) | ApiOutcome::Failed(desc)) => {
                warn!("failed to register Telegram bot commands: {desc}");
            }
            Err(e) => warn!("failed to register Telegram bot commands: {e}"),
        }
    }
}

/// JSON body for `sendMessage`.
pub(crate) fn message_body(
    chat_id: i64,
    text: &str,
    format: TextFormat,
    reply_to: Option<i64>,
) -> Value {
    let mut body = json!({
        "chat_id": chat_id,
        "text": text,
    });
    if let Some(mode) = parse_mode(format) {
        body["parse_mode"] = json!(mode);
    }
    if let Some(id) = reply_to {
        body["reply_parameters"] = json!({
            "message_id": id,
            "allow_sending_without_reply": true,
        });
    }
    body
}
