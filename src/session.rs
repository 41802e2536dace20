//! Connection session
//!
//! Owns one accepted connection end-to-end: the name prompt, the read
//! loop driving the watchdog and the command interpreter, and teardown.
//! The session moves through Connecting, Named, Active, Closing and
//! Closed by plain control flow; whichever of normal exit and watchdog
//! expiry comes first decides the departure announcement, and the
//! registry once-guard keeps that announcement to exactly one.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::command::{self, Flow};
use crate::error::AppError;
use crate::registry::ClientWriter;
use crate::router::{write_line, RoutedMessage};
use crate::server::ChatServer;
use crate::types::SessionId;
use crate::watchdog::Watchdog;

/// Prompt sent before the name line is read (deliberately unterminated)
const NAME_PROMPT: &[u8] = b"Enter your name: ";

/// Notice written to a client being reaped for inactivity
const TIMEOUT_NOTICE: &str = "you have been disconnected due to inactivity";

/// What ended the read loop; decides the departure announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disconnect {
    /// `/exit`, EOF, or a read error
    Left,
    /// Watchdog expiry
    TimedOut,
}

/// Drive one accepted connection from the name prompt to teardown.
///
/// Spawned per connection by the accept loop. Errors returned here end
/// this session only; the spawner logs them.
pub async fn run(server: Arc<ChatServer>, stream: TcpStream) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let (read_half, write_half) = stream.into_split();
    let writer: ClientWriter = Arc::new(Mutex::new(write_half));
    let mut lines = BufReader::new(read_half).lines();

    // Connecting: prompt, then block for the name line. A client that
    // goes away here was never registered and is not announced.
    writer.lock().await.write_all(NAME_PROMPT).await?;
    let name = match lines.next_line().await? {
        Some(line) => line.trim().to_string(),
        None => {
            debug!("{} disconnected before naming", peer_addr);
            return Ok(());
        }
    };

    // Named: register, announce, arm the watchdog. The empty name is
    // accepted as-is; no validation happens here.
    let id = SessionId::new();
    server
        .registry()
        .register(id, name.clone(), writer.clone())
        .await;
    info!("{} from {} registered as '{}'", id, peer_addr, name);

    if server
        .submit(RoutedMessage::broadcast(format!("{name} has joined the chat")))
        .await
        .is_err()
    {
        server.registry().unregister(id).await;
        return Err(AppError::RouterClosed);
    }

    let mut watchdog = Watchdog::arm(server.idle_timeout());

    // Active: every read re-arms the watchdog; expiry and the read are
    // folded into one select so the two exit paths cannot race within
    // the session.
    let disconnect = loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    watchdog.reset();
                    let (msg, flow) =
                        command::interpret(line.trim(), id, &name, server.registry()).await;
                    if let Some(msg) = msg {
                        if server.submit(msg).await.is_err() {
                            break Disconnect::Left;
                        }
                    }
                    if flow == Flow::Terminate {
                        break Disconnect::Left;
                    }
                }
                Ok(None) => break Disconnect::Left,
                Err(e) => {
                    warn!("read error for '{}' ({}): {}", name, id, e);
                    break Disconnect::Left;
                }
            },
            _ = watchdog.expired() => break Disconnect::TimedOut,
        }
    };

    // Closing
    watchdog.stop();

    if disconnect == Disconnect::TimedOut {
        // Best-effort notice to the client being reaped; allowed to
        // race the close
        if let Err(e) = write_line(&writer, TIMEOUT_NOTICE).await {
            debug!("timeout notice to {} failed: {}", id, e);
        }
    }

    // Only the path that observes the removal announces the departure
    if server.registry().unregister(id).await {
        let announcement = match disconnect {
            Disconnect::Left => format!("{name} has left the chat"),
            Disconnect::TimedOut => format!("{name} has been disconnected due to inactivity"),
        };
        info!("'{}' ({}) disconnected: {:?}", name, id, disconnect);
        if server
            .submit(RoutedMessage::broadcast(announcement))
            .await
            .is_err()
        {
            debug!("router gone before departure announcement for {}", id);
        }
    }

    Ok(())
}
