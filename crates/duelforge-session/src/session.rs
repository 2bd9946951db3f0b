//! The per-connection session record and its state transitions.

use std::net::SocketAddr;

use duelforge_clock::TurnClock;
use duelforge_protocol::{MAX_MESSAGE_LEN, MAX_NAME_LEN};
use duelforge_transport::ConnectionId;

// ---------------------------------------------------------------------------
// BattleState
// ---------------------------------------------------------------------------

/// Where a session is in the waiting/matched cycle.
///
/// ```text
/// Idle ──(name confirmed)──→ Waiting ──(matched)──→ InBattle
///                               ↑                       │
///                               └──(battle ends)────────┘
/// ```
///
/// - **Idle**: connected, still in the name-entry sub-protocol.
/// - **Waiting**: named, eligible for matchmaking.
/// - **InBattle**: paired with an opponent; battle fields are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleState {
    Idle,
    Waiting,
    InBattle,
}

impl BattleState {
    /// Whether the session is currently in a battle.
    pub fn is_in_battle(&self) -> bool {
        matches!(self, Self::InBattle)
    }
}

// ---------------------------------------------------------------------------
// Chat sub-state
// ---------------------------------------------------------------------------

/// The outcome of flushing the chat buffer with a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatFlush {
    /// A well-formed message, ready to deliver to the opponent.
    Sent(String),
    /// The buffer overflowed its bound; nothing is delivered.
    TooLong,
    /// The buffer was empty.
    Empty,
}

/// The result of feeding one byte into an active chat buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    /// Byte absorbed (or ignored, for `\r`); keep buffering.
    Buffered,
    /// The bound was just exceeded; warn the speaker once.
    OverflowWarning,
    /// Newline received; chat mode has ended with this outcome.
    Flush(ChatFlush),
}

/// Bounded accumulator for an in-battle chat message.
#[derive(Debug, Clone, Default)]
struct ChatBuffer {
    active: bool,
    buf: String,
    overflowed: bool,
}

impl ChatBuffer {
    fn begin(&mut self) {
        self.active = true;
        self.buf.clear();
        self.overflowed = false;
    }

    fn reset(&mut self) {
        self.active = false;
        self.buf.clear();
        self.overflowed = false;
    }

    fn push(&mut self, byte: u8) -> ChatInput {
        match byte {
            b'\n' => {
                let flush = if self.overflowed {
                    ChatFlush::TooLong
                } else if self.buf.is_empty() {
                    ChatFlush::Empty
                } else {
                    ChatFlush::Sent(std::mem::take(&mut self.buf))
                };
                self.reset();
                ChatInput::Flush(flush)
            }
            // Carriage returns are never buffered; only `\n` terminates.
            b'\r' => ChatInput::Buffered,
            _ => {
                if self.buf.chars().count() < MAX_MESSAGE_LEN {
                    self.buf.push(byte as char);
                    ChatInput::Buffered
                } else if !self.overflowed {
                    self.overflowed = true;
                    ChatInput::OverflowWarning
                } else {
                    ChatInput::Buffered
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One connected player's state on the server.
///
/// Created on accept, destroyed on disconnect; a session never outlives
/// its connection. Battle-scoped fields (`hitpoints`, `powermoves`,
/// `is_turn`, `clock`) are meaningful only while `battle` is
/// [`BattleState::InBattle`] and are reset at each match start.
#[derive(Debug, Clone)]
pub struct Session {
    /// The connection this session belongs to.
    pub id: ConnectionId,

    /// Remote address, for logging only.
    pub peer: SocketAddr,

    /// Player name; empty until the name-entry sub-protocol completes.
    pub name: String,

    /// Whether the name has been accepted as unique and non-empty.
    pub name_confirmed: bool,

    /// Waiting/matched cycle state.
    pub battle: BattleState,

    /// Current opponent. Set iff `battle` is `InBattle`, and the
    /// opponent's own `opponent` points back (symmetric pairing).
    pub opponent: Option<ConnectionId>,

    /// The opponent from the last completed battle, for rematch
    /// avoidance. Overwritten at the next match start, never cleared.
    pub last_opponent: Option<ConnectionId>,

    /// Battle-scoped health; the battle ends when this reaches 0.
    pub hitpoints: i32,

    /// Remaining power moves for the current battle.
    pub powermoves: u8,

    /// Whether it is this player's turn.
    pub is_turn: bool,

    /// Deadline for the current turn. `Some` only for the active player.
    pub clock: Option<TurnClock>,

    chat: ChatBuffer,
}

impl Session {
    /// Creates a fresh session for a new connection.
    pub fn new(id: ConnectionId, peer: SocketAddr) -> Self {
        Self {
            id,
            peer,
            name: String::new(),
            name_confirmed: false,
            battle: BattleState::Idle,
            opponent: None,
            last_opponent: None,
            hitpoints: 0,
            powermoves: 0,
            is_turn: false,
            clock: None,
            chat: ChatBuffer::default(),
        }
    }

    /// Appends one byte to the in-progress name.
    ///
    /// Bytes past the length bound are dropped; the terminator handling
    /// (and emptiness/uniqueness checks) live in the battle engine.
    pub fn push_name_byte(&mut self, byte: u8) {
        if self.name.chars().count() < MAX_NAME_LEN {
            self.name.push(byte as char);
        }
    }

    /// Moves the session into a battle against `opponent`.
    ///
    /// Records the rematch-avoidance link and clears turn/chat state;
    /// the caller assigns the first turn and starts the clock.
    pub fn enter_battle(
        &mut self,
        opponent: ConnectionId,
        hitpoints: i32,
        powermoves: u8,
    ) {
        self.battle = BattleState::InBattle;
        self.opponent = Some(opponent);
        self.last_opponent = Some(opponent);
        self.hitpoints = hitpoints;
        self.powermoves = powermoves;
        self.is_turn = false;
        self.clock = None;
        self.chat.reset();
    }

    /// Moves the session back to Waiting after a battle ends.
    ///
    /// `record_opponent` is `Some` when the battle ended by defeat (the
    /// pair must not be immediately re-matched) and `None` when it ended
    /// by forfeit, which records no rematch-avoidance link.
    pub fn leave_battle(&mut self, record_opponent: Option<ConnectionId>) {
        self.battle = BattleState::Waiting;
        self.opponent = None;
        self.is_turn = false;
        self.clock = None;
        self.chat.reset();
        if let Some(opponent) = record_opponent {
            self.last_opponent = Some(opponent);
        }
    }

    /// Whether the chat sub-mode is currently absorbing input.
    pub fn chat_active(&self) -> bool {
        self.chat.active
    }

    /// Enters the chat sub-mode with an empty buffer.
    pub fn begin_chat(&mut self) {
        self.chat.begin();
    }

    /// Feeds one byte to the active chat buffer.
    pub fn push_chat_byte(&mut self, byte: u8) -> ChatInput {
        self.chat.push(byte)
    }
}

// =========================================================================
// Tests
// =========================================================================
