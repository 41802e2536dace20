//! Chat Relay - Entry Point
//!
//! Starts the TCP listener and the message dispatcher, handing each
//! accepted connection to its own session task.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chat_relay::{session, ChatServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    // Bind address from the command line, idle timeout from the
    // environment; defaults otherwise
    let mut config = ServerConfig::default();
    if let Some(addr) = env::args().nth(1) {
        config.addr = addr;
    }
    if let Some(secs) = env::var("CHAT_IDLE_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
    {
        config.idle_timeout = Duration::from_secs(secs);
    }

    let (server, router) = ChatServer::new(config);
    tokio::spawn(router.run());

    let listener = TcpListener::bind(server.addr()).await?;
    info!(
        "chat relay listening on {} (idle timeout {:?})",
        server.addr(),
        server.idle_timeout()
    );

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("new connection from {}", addr);
                let server = Arc::clone(&server);

                // Spawn a session task for each connection
                tokio::spawn(async move {
                    if let Err(e) = session::run(server, stream).await {
                        error!("session error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}
