//! Server context
//!
//! The explicitly constructed object owning the registry, the router
//! submission handle, and the configuration. Every session receives it
//! by `Arc`; there are no ambient singletons.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::AppError;
use crate::registry::ConnectionRegistry;
use crate::router::{MessageRouter, RoutedMessage};

/// Channel buffer size for routed messages
const OUTBOUND_BUFFER: usize = 256;

/// Default silence period before the watchdog disconnects a client
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Relay configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub addr: String,
    /// Silence period after which a session is force-disconnected
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8070".to_string(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Central relay context
///
/// Owns the registry and the submitting end of the router conduit.
/// Construction also yields the [`MessageRouter`], which the caller
/// spawns as the single dispatcher task.
#[derive(Debug)]
pub struct ChatServer {
    config: ServerConfig,
    registry: ConnectionRegistry,
    outbound: mpsc::Sender<RoutedMessage>,
}

impl ChatServer {
    /// Build the context and its dispatcher
    pub fn new(config: ServerConfig) -> (Arc<Self>, MessageRouter) {
        let registry = ConnectionRegistry::new();
        let (outbound, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let router = MessageRouter::new(registry.clone(), rx);
        let server = Arc::new(Self {
            config,
            registry,
            outbound,
        });
        (server, router)
    }

    /// The live connection registry
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Configured watchdog duration
    pub fn idle_timeout(&self) -> Duration {
        self.config.idle_timeout
    }

    /// Configured bind address
    pub fn addr(&self) -> &str {
        &self.config.addr
    }

    /// Submit a message to the dispatcher.
    ///
    /// May wait for channel capacity; fails only once the router is
    /// gone during process teardown. Callers never hold the registry
    /// lock across this await.
    pub async fn submit(&self, msg: RoutedMessage) -> Result<(), AppError> {
        self.outbound
            .send(msg)
            .await
            .map_err(|_| AppError::RouterClosed)
    }
}
