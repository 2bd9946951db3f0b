//! Battle command bytes.

/// An action a battling player can take on their turn.
///
/// Parsed from a single byte. Anything that isn't a recognized command
/// maps to `None` and is ignored by the caller — pressing a wrong key
/// never produces an error on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `a` — basic attack, 2–6 damage.
    Attack,
    /// `p` — power move: 50% miss, otherwise triple a basic roll.
    PowerMove,
    /// `s` — enter the chat sub-mode.
    Speak,
    /// `t` — query the active player's remaining turn seconds.
    TimeLeft,
}

impl Command {
    /// Parses a command byte, or `None` for anything unrecognized.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'a' => Some(Self::Attack),
            b'p' => Some(Self::PowerMove),
            b's' => Some(Self::Speak),
            b't' => Some(Self::TimeLeft),
            _ => None,
        }
    }
}
