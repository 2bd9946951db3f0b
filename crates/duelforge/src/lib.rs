//! # Duelforge
//!
//! A text-protocol multiplayer battle arena server. Players connect over
//! plain TCP, pick a name, and are matched into one-on-one turn-based
//! battles with attacks, power moves, in-battle chat, and a 30-second
//! turn timer.
//!
//! The meta crate ties the layers together: transport → protocol →
//! session → battle. All game state lives in a single dispatcher task;
//! per-connection reader and writer tasks talk to it over channels.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use duelforge::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), duelforge::DuelforgeError> {
//!     let server = Server::builder().bind("0.0.0.0:51621").build().await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::DuelforgeError;
pub use server::{Server, ServerBuilder};

pub use duelforge_battle::{Arena, BattleConfig};
pub use duelforge_transport::ConnectionId;
