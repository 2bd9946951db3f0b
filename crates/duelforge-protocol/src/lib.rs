//! Wire protocol for duelforge.
//!
//! The protocol is plain text with no framing: clients send single
//! command bytes (plus newline-terminated names and chat lines), and the
//! server replies with human-readable lines. This crate defines the
//! "language" both sides speak:
//!
//! - **Commands** ([`Command`]) — the battle action keys a client can
//!   press on their turn.
//! - **Text** ([`text`]) — every server-visible message, byte-for-byte.
//!   Client compatibility depends on exact wording, so all strings live
//!   here and nowhere else.
//! - **Outbound** ([`Outbound`], [`Recipient`]) — a rendered message
//!   paired with who should receive it. The battle engine emits these;
//!   the dispatcher resolves and delivers them.
//!
//! There is no decode error type: by protocol policy, a byte that isn't
//! a recognized command in the current state is silently ignored.

mod command;
mod outbound;
pub mod text;

pub use command::Command;
pub use outbound::{Outbound, Recipient};

/// Maximum name length in characters.
pub const MAX_NAME_LEN: usize = 20;

/// Maximum chat message length in characters.
pub const MAX_MESSAGE_LEN: usize = 20;
