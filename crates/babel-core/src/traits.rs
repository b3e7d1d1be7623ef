use crate::{
    error::BabelError,
    message::{IncomingMessage, MessageRef, TextFormat},
};
use async_trait::async_trait;

/// Chat transport.
///
/// A channel delivers the operator's messages and lets the bot rewrite the
/// message it is working on. Implementations decide which message that is:
/// the operator's own message when the platform allows editing it, or a
/// fresh reply otherwise.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, BabelError>;

    /// Resolve the message the bot edits while handling `incoming`.
    async fn working_message(&self, incoming: &IncomingMessage) -> Result<MessageRef, BabelError>;

    /// Replace the text of an existing message.
    async fn edit(
        &self,
        message: &MessageRef,
        text: &str,
        format: TextFormat,
    ) -> Result<(), BabelError>;

    /// Delete a message.
    async fn delete(&self, message: &MessageRef) -> Result<(), BabelError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), BabelError>;
}
