//! Gateway: the event loop connecting the channel to commands, prompt
//! replies and auto mode.

pub mod auto;


use babel_core::{
    message::{IncomingMessage, MessageRef},
    traits::Channel,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    cleanup::delete_later,
    commands::{self, Command, CommandContext},
    composer::{translate_and_edit, Outcome},
    context::AppContext,
};
use auto::AutoMode;

/// The main gateway.
pub struct Gateway {
    app: Arc<AppContext>,
    channel: Arc<dyn Channel>,
}

impl Gateway {
    pub fn new(app: Arc<AppContext>, channel: Arc<dyn Channel>) -> Self {
        Self { app, channel }
    }

    /// Run until the channel closes or Ctrl+C. Each message runs as its own task.
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("Babel gateway starting on {}", self.channel.name());

        let mut rx: mpsc::Receiver<IncomingMessage> = self.channel.start().await?;
        info!("Channel started: {}", self.channel.name());

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(incoming) = msg else {
                        info!("Channel closed");
                        break;
                    };
                    let app = Arc::clone(&self.app);
                    let channel = Arc::clone(&self.channel);
                    tokio::spawn(async move {
                        handle_message(&app, &channel, incoming).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    async fn shutdown(&self) {
        info!("Shutting down...");
        if let Err(e) = self.channel.stop().await {
            warn!("Failed to stop channel {}: {e}", self.channel.name());
        }
        info!("Shutdown complete.");
    }
}

/// Route one operator message: prompt answer, command, or auto mode.
pub async fn handle_message(app: &AppContext, channel: &Arc<dyn Channel>, incoming: IncomingMessage) {
    let text = incoming.text.trim();
    if text.is_empty() {
        return;
    }

    if let Some(reply_to) = &incoming.reply_to {
        if let Some(prompt) = app.pending.take(incoming.chat_id, reply_to.message_id) {
            match commands::answer_prompt(app, &prompt, text) {
                Some(reply) => {
                    if let Some(working) = resolve_working(channel, &incoming).await {
                        let ctx = CommandContext {
                            app,
                            channel,
                            incoming: &incoming,
                            working: &working,
                        };
                        commands::deliver(&ctx, reply).await;
                    }
                    return;
                }
                None => {
                    let shown = MessageRef {
                        chat_id: incoming.chat_id,
                        message_id: reply_to.message_id,
                        business_connection_id: incoming.business_connection_id.clone(),
                    };
                    app.pending.insert(&shown, prompt);
                }
            }
        }
    }

    if let Some(cmd) = Command::parse(text) {
        debug!("command {cmd:?} in chat {}", incoming.chat_id);
        let Some(working) = resolve_working(channel, &incoming).await else {
            return;
        };
        let ctx = CommandContext {
            app,
            channel,
            incoming: &incoming,
            working: &working,
        };
        commands::handle(cmd, &ctx).await;
        return;
    }

    let settings = app.settings.get();
    let Some(request) = AutoMode::from_settings(&settings)
        .request(text, &settings, &app.detector)
        .await
    else {
        return;
    };
    let Some(working) = resolve_working(channel, &incoming).await else {
        return;
    };
    let outcome = translate_and_edit(app, channel, &working, &request).await;
    debug!("auto translation finished: {outcome:?}");
    // A placeholder reply that ended up unused goes away.
    if outcome == Outcome::Skipped && working != incoming.message_ref() {
        delete_later(Arc::clone(channel), working, Duration::ZERO);
    }
}

async fn resolve_working(channel: &Arc<dyn Channel>, incoming: &IncomingMessage) -> Option<MessageRef> {
    match channel.working_message(incoming).await {
        Ok(working) => Some(working),
        Err(e) => {
            error!("no message to work in for chat {}: {e}", incoming.chat_id);
            None
        }
    }
}
