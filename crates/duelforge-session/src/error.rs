//! Error types for the session layer.

use duelforge_transport::ConnectionId;

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A session with this connection id is already registered.
    ///
    /// Connection ids are minted by the transport and never reused, so
    /// this indicates registry corruption. Per the error policy, the
    /// server shuts down rather than continue with a corrupt registry.
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),
}
