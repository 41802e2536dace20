//! Line-Oriented TCP Chat Relay Library
//!
//! A multi-client text chat relay over plain newline-delimited TCP.
//! Clients register a display name on their first line and then
//! exchange broadcast and direct messages through a central dispatcher.
//!
//! # Features
//! - Display-name registration on connect
//! - Room-wide broadcast chat lines
//! - Private messages (`/msg <name> <text>`)
//! - Active-user listing (`/active-users`)
//! - Voluntary exit (`/exit`)
//! - Idle-connection reaping after a configurable silence period
//!
//! # Architecture
//! One tokio task per accepted connection plus a single dispatcher:
//! - `ConnectionRegistry` is the only shared mutable state, behind a
//!   lock-disciplined API
//! - Every outbound message flows through one mpsc conduit drained by
//!   `MessageRouter`, so per-connection write order follows submission
//!   order and writes never interleave
//! - Each `session` folds its read loop and its `Watchdog` into one
//!   `select!`, so normal exit and idle expiry cannot race
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use chat_relay::{session, ChatServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (server, router) = ChatServer::new(ServerConfig::default());
//!     tokio::spawn(router.run());
//!
//!     let listener = TcpListener::bind(server.addr()).await.unwrap();
//!     loop {
//!         let (stream, _) = listener.accept().await.unwrap();
//!         tokio::spawn(session::run(Arc::clone(&server), stream));
//!     }
//! }
//! ```

pub mod command;
pub mod error;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod types;
pub mod watchdog;

#[cfg(test)]
mod testutil;

// Re-export main types for convenience
pub use command::{Command, Flow};
pub use error::AppError;
pub use registry::ConnectionRegistry;
pub use router::{MessageRouter, RoutedMessage};
pub use server::{ChatServer, ServerConfig};
pub use types::SessionId;
pub use watchdog::Watchdog;
