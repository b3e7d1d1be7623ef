use serde::{Deserialize, Serialize};

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub telegram: Option<TelegramConfig>,
}

/// Telegram bot config.
///
/// Only messages from `owner_id` are processed. When the bot is attached to
/// the owner's account as a business bot, the owner's own chat messages are
/// edited in place; otherwise the bot answers in its private chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    /// Telegram user id of the operator. 0 = accept nobody.
    #[serde(default)]
    pub owner_id: i64,
}
