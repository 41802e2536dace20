//! Shared test helpers: localhost socket plumbing.

use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::registry::ClientWriter;

/// A connected localhost pair: (client side, server side).
pub(crate) async fn tcp_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).await.unwrap();
    let (server, _) = listener.accept().await.unwrap();
    (client, server)
}

/// The client side of a fresh connection plus the server-side write
/// half wrapped the way the registry stores it. The client side must
/// be kept alive for writes to succeed.
pub(crate) async fn writer_pair() -> (TcpStream, ClientWriter) {
    let (client, server) = tcp_pair().await;
    let (_read, write) = server.into_split();
    (client, Arc::new(Mutex::new(write)))
}
