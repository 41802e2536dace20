//! Message router
//!
//! The single serialized conduit carrying [`RoutedMessage`] values from
//! every session to one dispatcher task. The dispatcher performs the
//! actual writes, so each connection sees routed traffic in submission
//! order and no two messages ever interleave on one socket.

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::registry::{ClientWriter, ConnectionRegistry};
use crate::types::SessionId;

/// The unit of work carried from a session to the dispatcher
///
/// `recipient == None` broadcasts to every registered connection;
/// `Some(id)` delivers to exactly that connection if it is still
/// registered, and is silently dropped otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedMessage {
    /// Originating session, for attribution in logs
    pub sender: Option<SessionId>,
    /// Addressed recipient, already resolved at submission time
    pub recipient: Option<SessionId>,
    /// The line to deliver, without the trailing newline
    pub text: String,
}

impl RoutedMessage {
    /// Broadcast with no attributed sender (join/leave announcements)
    pub fn broadcast(text: impl Into<String>) -> Self {
        Self {
            sender: None,
            recipient: None,
            text: text.into(),
        }
    }

    /// Broadcast attributed to a sender (chat lines)
    pub fn broadcast_from(sender: SessionId, text: impl Into<String>) -> Self {
        Self {
            sender: Some(sender),
            recipient: None,
            text: text.into(),
        }
    }

    /// Message addressed to one connection (usage and error replies)
    pub fn direct(recipient: SessionId, text: impl Into<String>) -> Self {
        Self {
            sender: None,
            recipient: Some(recipient),
            text: text.into(),
        }
    }

    /// Message addressed to one connection, attributed to a sender
    /// (private messages)
    pub fn direct_from(
        sender: SessionId,
        recipient: SessionId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender: Some(sender),
            recipient: Some(recipient),
            text: text.into(),
        }
    }
}

/// Dispatcher loop draining the router conduit
///
/// Runs for the lifetime of the process; exits only when every
/// submitting handle has been dropped during process teardown.
#[derive(Debug)]
pub struct MessageRouter {
    registry: ConnectionRegistry,
    rx: mpsc::Receiver<RoutedMessage>,
}

impl MessageRouter {
    /// Build a dispatcher over the given registry and conduit
    pub fn new(registry: ConnectionRegistry, rx: mpsc::Receiver<RoutedMessage>) -> Self {
        Self { registry, rx }
    }

    /// Drain the conduit, delivering each message in submission order
    pub async fn run(mut self) {
        info!("message router started");

        while let Some(msg) = self.rx.recv().await {
            self.dispatch(msg).await;
        }

        info!("message router shutting down");
    }

    /// Deliver one message: to its addressed recipient, or to every
    /// registered connection.
    async fn dispatch(&self, msg: RoutedMessage) {
        match msg.recipient {
            Some(recipient) => {
                // Already resolved at submission time; a recipient that
                // disconnected in the meantime is a no-op, not an error
                let Some(writer) = self.registry.writer(recipient).await else {
                    debug!("recipient {} no longer connected, dropping", recipient);
                    return;
                };
                if let Err(e) = write_line(&writer, &msg.text).await {
                    warn!("write to {} failed: {}", recipient, e);
                }
            }
            None => {
                for (id, writer) in self.registry.writers().await {
                    // One dead connection must not abort the rest
                    if let Err(e) = write_line(&writer, &msg.text).await {
                        warn!("broadcast write to {} failed: {}", id, e);
                    }
                }
            }
        }
    }
}

/// Write one newline-terminated line to a client connection.
pub(crate) async fn write_line(writer: &ClientWriter, text: &str) -> std::io::Result<()> {
    let mut writer = writer.lock().await;
    writer.write_all(text.as_bytes()).await?;
    writer.write_all(b"\n").await
}
