//! Transport layer for duelforge.
//!
//! Provides the [`Transport`] and [`Connection`] traits plus the plain-TCP
//! implementation the battle server runs on. This layer is deliberately
//! thin: it binds, accepts, and moves raw bytes. Everything above it
//! (name entry, turns, chat) is game logic and lives elsewhere.
//!
//! The wire protocol is character-oriented, so [`Connection::recv_byte`]
//! yields exactly one byte per call. That single-byte read is the
//! fairness unit of the whole server: the dispatcher processes one byte
//! per readiness event per connection, so no client can starve the rest
//! by flooding input.

#![allow(async_fn_in_trait)]

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{TcpConnection, TcpTransport};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
///
/// All cross-session references (current opponent, last opponent) are
/// stored as `ConnectionId`s and resolved through the registry, never as
/// pointers — a dead id simply fails the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Returns the local address the transport is bound to.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// A single stream connection that can send and receive bytes.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives exactly one byte from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv_byte(&self) -> Result<Option<u8>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the remote peer's address (informational, for logging).
    fn peer_addr(&self) -> SocketAddr;
}
