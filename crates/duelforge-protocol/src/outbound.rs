//! Outbound messages and their recipients.

use duelforge_transport::ConnectionId;

/// Who should receive an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// A single connection.
    Player(ConnectionId),
    /// Every session that has confirmed a name.
    AllNamed,
    /// Every named session except one (e.g., the arena-entry broadcast
    /// excludes the player who just entered).
    AllNamedExcept(ConnectionId),
}

/// A rendered protocol message paired with its recipient.
///
/// The battle engine returns these instead of writing to sockets, which
/// keeps the whole game state machine synchronous and testable. The
/// dispatcher resolves the recipient against the registry and hands the
/// text to the per-connection writer tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: Recipient,
    pub text: String,
}

impl Outbound {
    /// A message for a single player.
    pub fn to(id: ConnectionId, text: impl Into<String>) -> Self {
        Self {
            to: Recipient::Player(id),
            text: text.into(),
        }
    }

    /// A broadcast to all named sessions.
    pub fn broadcast(text: impl Into<String>) -> Self {
        Self {
            to: Recipient::AllNamed,
            text: text.into(),
        }
    }

    /// A broadcast to all named sessions except `excluded`.
    pub fn broadcast_except(
        excluded: ConnectionId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            to: Recipient::AllNamedExcept(excluded),
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_constructors_set_recipient() {
        let id = ConnectionId::new(3);
        assert_eq!(Outbound::to(id, "hi").to, Recipient::Player(id));
        assert_eq!(Outbound::broadcast("hi").to, Recipient::AllNamed);
        assert_eq!(
            Outbound::broadcast_except(id, "hi").to,
            Recipient::AllNamedExcept(id)
        );
    }
}
