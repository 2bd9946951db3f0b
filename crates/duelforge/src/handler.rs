//! Per-connection tasks and the events they feed the dispatcher.
//!
//! Each accepted connection gets two Tokio tasks:
//!
//! - a **reader** that pulls one byte at a time off the socket and
//!   forwards it as an [`ArenaEvent::Byte`]. The single-byte read is the
//!   server's fairness unit: no client can starve the others by
//!   flooding input, because each byte is a separate event in the
//!   dispatcher's queue.
//! - a **writer** that drains an unbounded channel of rendered text.
//!   The dispatcher never writes to sockets directly, so one slow or
//!   dead recipient can't hold up the game for anyone else.

use std::net::SocketAddr;
use std::sync::Arc;

use duelforge_transport::{Connection, ConnectionId, TcpConnection};
use tokio::sync::mpsc;
use tracing::debug;

/// Everything the dispatcher task reacts to.
pub(crate) enum ArenaEvent {
    /// A connection was accepted; `writer` is its outbound channel.
    Connected {
        id: ConnectionId,
        peer: SocketAddr,
        writer: mpsc::UnboundedSender<String>,
    },
    /// One input byte from a connection.
    Byte { id: ConnectionId, byte: u8 },
    /// The connection closed, cleanly or not.
    Disconnected { id: ConnectionId },
}

/// Spawns the reader and writer tasks for a freshly accepted connection.
pub(crate) fn spawn_connection(
    conn: TcpConnection,
    events: mpsc::UnboundedSender<ArenaEvent>,
) {
    let id = conn.id();
    let peer = conn.peer_addr();
    let conn = Arc::new(conn);
    let (writer_tx, mut writer_rx) = mpsc::unbounded_channel::<String>();

    if events
        .send(ArenaEvent::Connected {
            id,
            peer,
            writer: writer_tx,
        })
        .is_err()
    {
        // Dispatcher is gone; the server is shutting down.
        return;
    }

    let writer_conn = Arc::clone(&conn);
    let writer_events = events.clone();
    tokio::spawn(async move {
        while let Some(text) = writer_rx.recv().await {
            if let Err(e) = writer_conn.send(text.as_bytes()).await {
                debug!(%id, error = %e, "write failed");
                // A failed write means the client is gone; report the
                // disconnect now instead of waiting for the reader half
                // to see it. The dispatcher ignores the duplicate the
                // reader will eventually send.
                let _ =
                    writer_events.send(ArenaEvent::Disconnected { id });
                break;
            }
        }
        // Channel closed: the dispatcher dropped this connection.
        let _ = writer_conn.close().await;
    });

    tokio::spawn(async move {
        loop {
            match conn.recv_byte().await {
                Ok(Some(byte)) => {
                    if events.send(ArenaEvent::Byte { id, byte }).is_err() {
                        return;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(%id, error = %e, "recv error");
                    break;
                }
            }
        }
        let _ = events.send(ArenaEvent::Disconnected { id });
    });
}
