//! Unified error type for the duelforge server.

use duelforge_session::SessionError;
use duelforge_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `duelforge` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DuelforgeError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A session-level error (registry corruption).
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use duelforge_transport::ConnectionId;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "gone");
        let err: DuelforgeError = TransportError::SendFailed(io).into();
        assert!(matches!(err, DuelforgeError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_session_error() {
        let err: DuelforgeError =
            SessionError::AlreadyRegistered(ConnectionId::new(3)).into();
        assert!(matches!(err, DuelforgeError::Session(_)));
        assert!(err.to_string().contains("conn-3"));
    }
}
