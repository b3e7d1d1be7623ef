use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An incoming text message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Platform-specific chat id.
    pub chat_id: i64,
    /// Platform-specific message id.
    pub message_id: i64,
    /// Platform-specific sender id.
    pub sender_id: i64,
    /// Message text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// The message this one replies to, if any.
    #[serde(default)]
    pub reply_to: Option<ReplyContext>,
    /// Set when the message arrived through a business connection, which
    /// lets the bot edit it in place.
    #[serde(default)]
    pub business_connection_id: Option<String>,
}

impl IncomingMessage {
    /// Text of the replied-to message, if it has any.
    pub fn reply_text(&self) -> Option<&str> {
        self.reply_to
            .as_ref()
            .and_then(|r| r.text.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// Handle to the incoming message itself.
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat_id,
            message_id: self.message_id,
            business_connection_id: self.business_connection_id.clone(),
        }
    }
}

/// The message an incoming message replies to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyContext {
    pub message_id: i64,
    pub text: Option<String>,
}

/// Handle to a message that can be edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
    #[serde(default)]
    pub business_connection_id: Option<String>,
}

/// How message text should be interpreted by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextFormat {
    #[default]
    Plain,
    Html,
}
