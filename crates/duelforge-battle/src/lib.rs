//! Matchmaking and the battle engine for duelforge.
//!
//! The heart of the crate is [`Arena`]: a deterministic state machine
//! over the session registry that the server's dispatcher task drives
//! with connection, byte, disconnect, and tick events. The arena owns
//! all game rules — name entry, matchmaking, turns, damage, chat, and
//! timeouts — and emits [`Outbound`](duelforge_protocol::Outbound)
//! messages instead of performing I/O, so every rule is testable with a
//! seeded RNG and a simulated clock.
//!
//! # Key types
//!
//! - [`Arena`] — the full game state machine
//! - [`BattleConfig`] — tunable stat ranges and the turn limit
//! - [`find_opponent`] — the matchmaking scan with rematch avoidance

mod arena;
mod config;
mod matchmaker;

pub use arena::Arena;
pub use config::BattleConfig;
pub use matchmaker::find_opponent;
