//! `Server` builder and the dispatcher loop.
//!
//! This is the entry point for running a duelforge server. It ties
//! together all the layers: transport → protocol → session → battle.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use duelforge_battle::{Arena, BattleConfig};
use duelforge_clock::Ticker;
use duelforge_protocol::{Outbound, Recipient};
use duelforge_transport::{ConnectionId, TcpTransport, Transport};
use tokio::sync::mpsc;

use crate::handler::{spawn_connection, ArenaEvent};
use crate::DuelforgeError;

/// Builder for configuring and starting a duelforge server.
///
/// # Example
///
/// ```rust,ignore
/// let server = Server::builder()
///     .bind("0.0.0.0:51621")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ServerBuilder {
    bind_addr: String,
    battle_config: BattleConfig,
    tick_period: Option<Duration>,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:51621".to_string(),
            battle_config: BattleConfig::default(),
            tick_period: Some(Duration::from_secs(1)),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the battle rules.
    pub fn battle_config(mut self, config: BattleConfig) -> Self {
        self.battle_config = config;
        self
    }

    /// Sets the period of the turn-expiry sweep.
    ///
    /// One second by default; an idle turn therefore expires within a
    /// second of its deadline.
    pub fn tick_period(mut self, period: Duration) -> Self {
        self.tick_period = Some(period);
        self
    }

    /// Disables the periodic sweep entirely.
    ///
    /// Turn expiry is then detected only when a battle participant's
    /// input is dispatched, so a turn where both sides go idle sits
    /// unexpired until someone presses a key.
    pub fn polled_expiry_only(mut self) -> Self {
        self.tick_period = None;
        self
    }

    /// Binds the transport and builds the server.
    pub async fn build(self) -> Result<Server, DuelforgeError> {
        let transport = TcpTransport::bind(&self.bind_addr).await?;
        Ok(Server {
            transport,
            arena: Arena::new(self.battle_config),
            tick_period: self.tick_period,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running duelforge server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct Server {
    transport: TcpTransport,
    arena: Arena,
    tick_period: Option<Duration>,
}

impl Server {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server until it fails or the process is terminated.
    ///
    /// The accept loop runs in its own task; this task becomes the
    /// dispatcher, the single owner of all game state. Accept failures
    /// are logged and skipped. Registry corruption ends the loop with an
    /// error, since continuing would corrupt ongoing battles.
    pub async fn run(self) -> Result<(), DuelforgeError> {
        tracing::info!("duelforge server running");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut transport = self.transport;
        tokio::spawn(async move {
            loop {
                match transport.accept().await {
                    Ok(conn) => spawn_connection(conn, events_tx.clone()),
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                }
            }
        });

        let ticker = match self.tick_period {
            Some(period) => Ticker::every(period),
            None => Ticker::disabled(),
        };
        let dispatcher = Dispatcher {
            arena: self.arena,
            writers: HashMap::new(),
        };
        dispatcher.run(events_rx, ticker).await
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// The single task that owns the arena.
///
/// Every event is handled to completion before the next one starts, so
/// the game rules never see a half-applied state.
struct Dispatcher {
    arena: Arena,
    writers: HashMap<ConnectionId, mpsc::UnboundedSender<String>>,
}

impl Dispatcher {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<ArenaEvent>,
        mut ticker: Ticker,
    ) -> Result<(), DuelforgeError> {
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    self.handle(event)?;
                }
                _ = ticker.tick() => {
                    let out = self.arena.on_tick(Instant::now());
                    self.deliver(out);
                }
            }
        }
        Ok(())
    }

    fn handle(&mut self, event: ArenaEvent) -> Result<(), DuelforgeError> {
        match event {
            ArenaEvent::Connected { id, peer, writer } => {
                self.writers.insert(id, writer);
                let out = self.arena.on_connect(id, peer)?;
                self.deliver(out);
            }
            ArenaEvent::Byte { id, byte } => {
                let out = self.arena.on_byte(id, byte, Instant::now());
                self.deliver(out);
            }
            ArenaEvent::Disconnected { id } => {
                // Dropping the writer ends the writer task, which closes
                // the socket.
                self.writers.remove(&id);
                let out = self.arena.on_disconnect(id, Instant::now());
                self.deliver(out);
            }
        }
        Ok(())
    }

    /// Resolves recipients against the registry and queues the text.
    fn deliver(&self, out: Vec<Outbound>) {
        for message in out {
            match message.to {
                Recipient::Player(id) => self.send_to(id, &message.text),
                Recipient::AllNamed => {
                    for id in self.arena.registry().named_ids() {
                        self.send_to(id, &message.text);
                    }
                }
                Recipient::AllNamedExcept(excluded) => {
                    for id in self.arena.registry().named_ids() {
                        if id != excluded {
                            self.send_to(id, &message.text);
                        }
                    }
                }
            }
        }
    }

    fn send_to(&self, id: ConnectionId, text: &str) {
        if let Some(writer) = self.writers.get(&id) {
            // A dead writer means the disconnect event is already in
            // flight; the message is dropped, as it would be for any
            // vanished peer.
            let _ = writer.send(text.to_string());
        }
    }
}
