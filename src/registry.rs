//! Connection registry
//!
//! Thread-safe mapping of live session handles to display names and
//! write halves. The registry is the only shared mutable structure in
//! the relay; every access goes through its lock, and callers only
//! ever receive independent copies (cloned strings and `Arc`s), never
//! references into the internal map.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, RwLock};

use crate::types::SessionId;

/// Shared write half of one client connection.
///
/// The owning session and the dispatcher both hold clones; the mutex
/// serializes the few direct writes a session makes (name prompt,
/// timeout notice) against routed traffic.
pub type ClientWriter = Arc<Mutex<OwnedWriteHalf>>;

/// One registered client: display name plus the sink for its bytes.
#[derive(Debug)]
struct ClientRecord {
    name: String,
    writer: ClientWriter,
}

/// Thread-safe registry of live connections
///
/// Cheaply cloneable handle; all clones share the same map. A session
/// appears here exactly between completed registration and teardown.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<SessionId, ClientRecord>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a client record. Always succeeds.
    pub async fn register(&self, id: SessionId, name: String, writer: ClientWriter) {
        let mut map = self.inner.write().await;
        map.insert(id, ClientRecord { name, writer });
    }

    /// Remove a client record if present.
    ///
    /// Idempotent: removing an absent key succeeds silently. Returns
    /// whether an entry was actually removed, so that of the two
    /// teardown paths racing for the same session, only the one that
    /// observes the removal announces the departure.
    pub async fn unregister(&self, id: SessionId) -> bool {
        let mut map = self.inner.write().await;
        map.remove(&id).is_some()
    }

    /// Independent copy of all registered display names.
    ///
    /// Taken under the shared lock so the caller can format and send
    /// the active-users listing without holding the lock during I/O.
    /// Order is unspecified.
    pub async fn snapshot(&self) -> Vec<String> {
        let map = self.inner.read().await;
        map.values().map(|record| record.name.clone()).collect()
    }

    /// Resolve a display name to a session handle.
    ///
    /// Names are not unique; this returns the first match found during
    /// iteration (first-match-wins).
    pub async fn lookup(&self, name: &str) -> Option<SessionId> {
        let map = self.inner.read().await;
        map.iter()
            .find(|(_, record)| record.name == name)
            .map(|(id, _)| *id)
    }

    /// Write half for one session, if still registered.
    pub async fn writer(&self, id: SessionId) -> Option<ClientWriter> {
        let map = self.inner.read().await;
        map.get(&id).map(|record| record.writer.clone())
    }

    /// Write halves of every registered session, for broadcast dispatch.
    ///
    /// The `Arc`s are cloned out under the shared lock; the lock is
    /// released before any byte is written.
    pub async fn writers(&self) -> Vec<(SessionId, ClientWriter)> {
        let map = self.inner.read().await;
        map.iter()
            .map(|(id, record)| (*id, record.writer.clone()))
            .collect()
    }

    /// Number of currently registered sessions
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether no sessions are registered
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testutil::writer_pair;

    /// Registry-ready write half. These tests never write through it,
    /// so the client side is free to drop.
    async fn test_writer() -> ClientWriter {
        let (_client, writer) = writer_pair().await;
        writer
    }

    #[tokio::test]
    async fn test_register_and_snapshot() {
        let registry = ConnectionRegistry::new();
        registry
            .register(SessionId::new(), "alice".to_string(), test_writer().await)
            .await;
        registry
            .register(SessionId::new(), "bob".to_string(), test_writer().await)
            .await;

        let mut names = registry.snapshot().await;
        names.sort();
        assert_eq!(names, vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let id = SessionId::new();
        registry
            .register(id, "alice".to_string(), test_writer().await)
            .await;

        assert!(registry.unregister(id).await);
        // Second removal is a silent no-op
        assert!(!registry.unregister(id).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_unregister_unknown_is_noop() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.unregister(SessionId::new()).await);
    }

    #[tokio::test]
    async fn test_lookup_finds_registered_name() {
        let registry = ConnectionRegistry::new();
        let id = SessionId::new();
        registry
            .register(id, "alice".to_string(), test_writer().await)
            .await;

        assert_eq!(registry.lookup("alice").await, Some(id));
        assert_eq!(registry.lookup("bob").await, None);
    }

    #[tokio::test]
    async fn test_lookup_duplicate_name_returns_a_match() {
        let registry = ConnectionRegistry::new();
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        registry
            .register(id1, "alice".to_string(), test_writer().await)
            .await;
        registry
            .register(id2, "alice".to_string(), test_writer().await)
            .await;

        // First-match-wins: either handle is acceptable
        let found = registry.lookup("alice").await.unwrap();
        assert!(found == id1 || found == id2);
    }

    #[tokio::test]
    async fn test_reregister_overwrites() {
        let registry = ConnectionRegistry::new();
        let id = SessionId::new();
        registry
            .register(id, "alice".to_string(), test_writer().await)
            .await;
        registry
            .register(id, "alicia".to_string(), test_writer().await)
            .await;

        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.snapshot().await, vec!["alicia".to_string()]);
        assert_eq!(registry.lookup("alice").await, None);
    }

    #[tokio::test]
    async fn test_writer_gone_after_unregister() {
        let registry = ConnectionRegistry::new();
        let id = SessionId::new();
        registry
            .register(id, "alice".to_string(), test_writer().await)
            .await;
        assert!(registry.writer(id).await.is_some());

        registry.unregister(id).await;
        assert!(registry.writer(id).await.is_none());
        assert!(registry.writers().await.is_empty());
    }
}
