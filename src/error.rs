//! Error types for the chat relay
//!
//! Defines application-level errors for session and router failures.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Everything here ends a single session; nothing is fatal to the
/// process. The spawner logs the error and the other sessions and the
/// dispatcher keep running.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error on the client connection (treated as a disconnect)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The router channel is closed (process is tearing down)
    #[error("message router closed")]
    RouterClosed,
}
