//! Session state for duelforge.
//!
//! A "session" is the server's record of one connected player: their
//! name-entry progress, battle status, hitpoints, and chat sub-state.
//! The [`Registry`] is the live collection of all sessions, in
//! connection order.
//!
//! # How it fits in the stack
//!
//! ```text
//! Battle engine (above)  ← mutates sessions through the registry
//!     ↕
//! Session layer (this crate)  ← pure data + small state transitions
//!     ↕
//! Transport layer (below)  ← provides ConnectionId
//! ```
//!
//! Nothing here performs I/O or knows about sockets beyond the opaque
//! [`ConnectionId`](duelforge_transport::ConnectionId); all cross-session
//! references are ids resolved through the registry, so a disconnected
//! player can never be followed through a dangling pointer.

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::Registry;
pub use session::{BattleState, ChatFlush, ChatInput, Session};
