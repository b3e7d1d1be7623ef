//! Long-polling update loop and Channel trait implementation.

use super::types::{TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use babel_core::{
    error::BabelError,
    message::{IncomingMessage, MessageRef, TextFormat},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Placeholder shown while the bot's own reply is being composed.
const WORKING_PLACEHOLDER: &str = "⏳";

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, BabelError> {
        if self.config.owner_id == 0 {
            return Err(BabelError::Channel(
                "telegram owner_id is not set; refusing to accept messages from anyone".into(),
            ));
        }
        self.register_commands().await;

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let owner_id = self.config.owner_id;
        let last_update_id = self.last_update_id.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let last = last_update_id.lock().await;
                let offset = last.map(|id| id + 1);
                drop(last);

                let mut url = format!(
                    "{base_url}/getUpdates?timeout=30&allowed_updates=%5B%22message%22%2C%22business_message%22%5D"
                );
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match client
                    .get(&url)
                    .timeout(std::time::Duration::from_secs(35))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let update_id = update.update_id;
                    let Some(msg) = update.into_message() else {
                        continue;
                    };
                    let Some(incoming) = msg.into_incoming(owner_id) else {
                        debug!("telegram: skipping update {update_id} (not an owner text message)");
                        continue;
                    };

                    if tx.send(incoming).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn working_message(&self, incoming: &IncomingMessage) -> Result<MessageRef, BabelError> {
        if incoming.business_connection_id.is_some() {
            return Ok(incoming.message_ref());
        }
        self.send_text(
            incoming.chat_id,
            WORKING_PLACEHOLDER,
            TextFormat::Plain,
            Some(incoming.message_id),
        )
        .await
    }

    async fn edit(
        &self,
        message: &MessageRef,
        text: &str,
        format: TextFormat,
    ) -> Result<(), BabelError> {
        self.edit_text(message, text, format).await
    }

    async fn delete(&self, message: &MessageRef) -> Result<(), BabelError> {
        self.delete_message(message).await
    }

    async fn stop(&self) -> Result<(), BabelError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}
