//! Telegram Bot API deserialization types.

use babel_core::message::{IncomingMessage, ReplyContext};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
    pub business_message: Option<TgMessage>,
}

impl TgUpdate {
    pub fn into_message(self) -> Option<TgMessage> {
        self.message.or(self.business_message)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    #[serde(default)]
    pub date: i64,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub reply_to_message: Option<Box<TgMessage>>,
    pub business_connection_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUser {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgChat {
    pub id: i64,
}

impl TgMessage {
    /// Convert to an [`IncomingMessage`] if it is a text message from `owner_id`.
    pub fn into_incoming(self, owner_id: i64) -> Option<IncomingMessage> {
        let sender = self.from.as_ref()?.id;
        if sender != owner_id {
            return None;
        }
        let text = self.text?;
        let reply_to = self.reply_to_message.map(|r| ReplyContext {
            message_id: r.message_id,
            text: r.text.or(r.caption),
        });
        let timestamp = DateTime::<Utc>::from_timestamp(self.date, 0).unwrap_or_else(Utc::now);
        Some(IncomingMessage {
            channel: "telegram".to_string(),
            chat_id: self.chat.id,
            message_id: self.message_id,
            sender_id: sender,
            text,
            timestamp,
            reply_to,
            business_connection_id: self.business_connection_id,
        })
    }
}
