//! Deferred cleanup: delayed deletions that run detached from the request.

use babel_core::{error::BabelError, message::MessageRef, traits::Channel};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawn a detached unit of work. Its failure is logged and goes nowhere else.
pub fn spawn_tracked<F>(label: &'static str, work: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), BabelError>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = work.await {
            debug!("{label} failed: {e}");
        }
    })
}

/// Delete `message` after `delay`.
pub fn delete_later(
    channel: Arc<dyn Channel>,
    message: MessageRef,
    delay: Duration,
) -> JoinHandle<()> {
    spawn_tracked("delayed delete", async move {
        tokio::time::sleep(delay).await;
        channel.delete(&message).await
    })
}
