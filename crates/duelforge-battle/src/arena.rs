//! The arena: one state machine for every connected player.
//!
//! The dispatcher task feeds the arena four kinds of events (connect,
//! input byte, tick, disconnect) and forwards the [`Outbound`] messages
//! it returns. The arena itself never touches a socket or the system
//! clock: callers pass `now` explicitly and randomness comes from an
//! owned [`StdRng`], so a seeded arena driven with fabricated instants
//! is fully deterministic.

use std::net::SocketAddr;
use std::time::Instant;

use duelforge_clock::TurnClock;
use duelforge_protocol::{text, Command, Outbound};
use duelforge_session::{
    BattleState, ChatFlush, ChatInput, Registry, Session, SessionError,
};
use duelforge_transport::ConnectionId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::{find_opponent, BattleConfig};

/// The two attack commands, distinguished only at damage-roll time.
enum AttackKind {
    Basic,
    Power,
}

/// Game state for the whole server: the session registry plus the rules
/// that move it.
///
/// All methods are synchronous and single-threaded; the owning
/// dispatcher task serializes every event, so no two events ever
/// interleave mid-rule.
pub struct Arena {
    registry: Registry,
    config: BattleConfig,
    rng: StdRng,
}

impl Arena {
    /// Creates an arena with an OS-seeded RNG.
    pub fn new(config: BattleConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates an arena with a caller-supplied RNG.
    ///
    /// Tests pair this with [`SeedableRng::seed_from_u64`] to make stat
    /// and damage rolls reproducible.
    pub fn with_rng(config: BattleConfig, rng: StdRng) -> Self {
        Self {
            registry: Registry::new(),
            config: config.validated(),
            rng,
        }
    }

    /// Read access to the session registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Looks up a single session.
    pub fn session(&self, id: ConnectionId) -> Option<&Session> {
        self.registry.get(id)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// A new connection was accepted.
    ///
    /// # Errors
    /// [`SessionError::AlreadyRegistered`] if the connection id is
    /// already present. Ids are never reused, so this is registry
    /// corruption and the caller should shut the server down.
    pub fn on_connect(
        &mut self,
        id: ConnectionId,
        peer: SocketAddr,
    ) -> Result<Vec<Outbound>, SessionError> {
        self.registry.add(Session::new(id, peer))?;
        info!(%id, %peer, "player connected");
        Ok(vec![Outbound::to(id, text::WELCOME)])
    }

    /// One input byte arrived from a connection.
    ///
    /// Unknown ids are ignored: the reader task may still be draining
    /// after a disconnect was dispatched.
    pub fn on_byte(
        &mut self,
        id: ConnectionId,
        byte: u8,
        now: Instant,
    ) -> Vec<Outbound> {
        let Some(session) = self.registry.get(id) else {
            return Vec::new();
        };
        if !session.name_confirmed {
            return self.name_byte(id, byte, now);
        }
        match session.battle {
            BattleState::InBattle => self.battle_byte(id, byte, now),
            // Waiting players have no commands; their bytes are dropped.
            BattleState::Idle | BattleState::Waiting => Vec::new(),
        }
    }

    /// Periodic wake: sweep for expired turns.
    ///
    /// Each battle is visited at most once per sweep because only the
    /// active side carries `is_turn` and a clock.
    pub fn on_tick(&mut self, now: Instant) -> Vec<Outbound> {
        let mut out = Vec::new();
        for id in self.registry.ids() {
            let Some(session) = self.registry.get(id) else {
                continue;
            };
            if session.battle.is_in_battle()
                && session.is_turn
                && session.clock.is_some_and(|clock| clock.is_expired(now))
            {
                out.extend(self.force_timeout(id, now));
            }
        }
        out
    }

    /// A connection closed or failed.
    ///
    /// If the player was mid-battle the opponent wins by forfeit, with
    /// no rematch-avoidance link recorded, and is matchmade again
    /// immediately. The departure broadcast goes out after removal, so
    /// only the remaining named sessions receive it.
    pub fn on_disconnect(
        &mut self,
        id: ConnectionId,
        now: Instant,
    ) -> Vec<Outbound> {
        let Some(session) = self.registry.remove(id) else {
            return Vec::new();
        };
        info!(%id, peer = %session.peer, "player disconnected");

        let mut out = Vec::new();
        let mut bereaved = None;
        if session.battle.is_in_battle() {
            if let Some(opponent_id) = session.opponent {
                if let Some(opponent) = self.registry.get_mut(opponent_id) {
                    opponent.leave_battle(None);
                    out.push(Outbound::to(
                        opponent_id,
                        text::dropped_win(&session.name),
                    ));
                    out.push(Outbound::to(opponent_id, text::AWAITING_OPPONENT));
                    bereaved = Some(opponent_id);
                }
            }
        }
        if session.name_confirmed {
            out.push(Outbound::broadcast(text::left_arena(&session.name)));
        }
        // The survivor already holds the awaiting notice; only a found
        // opponent produces further output.
        if let Some(opponent_id) = bereaved {
            if let Some(next) = find_opponent(&self.registry, opponent_id) {
                out.extend(self.start_match(opponent_id, next, now));
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // Name entry
    // -----------------------------------------------------------------------

    fn name_byte(
        &mut self,
        id: ConnectionId,
        byte: u8,
        now: Instant,
    ) -> Vec<Outbound> {
        match byte {
            // `\r` is ignored so `\r\n` and `\n` line endings behave
            // identically.
            b'\r' => Vec::new(),
            b'\n' => self.confirm_name(id, now),
            _ => {
                if let Some(session) = self.registry.get_mut(id) {
                    session.push_name_byte(byte);
                }
                Vec::new()
            }
        }
    }

    fn confirm_name(&mut self, id: ConnectionId, now: Instant) -> Vec<Outbound> {
        let name = match self.registry.get(id) {
            Some(session) => session.name.clone(),
            None => return Vec::new(),
        };
        if name.is_empty() {
            return vec![Outbound::to(id, text::NAME_EMPTY)];
        }
        if self.registry.find_by_name(&name).is_some() {
            // The rejected name is cleared; the player starts over.
            if let Some(session) = self.registry.get_mut(id) {
                session.name.clear();
            }
            return vec![Outbound::to(id, text::NAME_TAKEN)];
        }

        if let Some(session) = self.registry.get_mut(id) {
            session.name_confirmed = true;
            session.battle = BattleState::Waiting;
        }
        info!(%id, name = %name, "player joined the arena");

        // The broadcast excludes the new player; they get either a match
        // or the awaiting notice instead.
        let mut out =
            vec![Outbound::broadcast_except(id, text::entered_arena(&name))];
        match find_opponent(&self.registry, id) {
            Some(opponent) => out.extend(self.start_match(id, opponent, now)),
            None => out.push(Outbound::to(id, text::AWAITING_OPPONENT)),
        }
        out
    }

    // -----------------------------------------------------------------------
    // Battle input
    // -----------------------------------------------------------------------

    fn battle_byte(
        &mut self,
        id: ConnectionId,
        byte: u8,
        now: Instant,
    ) -> Vec<Outbound> {
        let Some(session) = self.registry.get(id) else {
            return Vec::new();
        };
        let Some(opponent_id) = session.opponent else {
            return Vec::new();
        };
        let is_turn = session.is_turn;
        let in_chat = session.chat_active();

        // The active side's deadline is checked before anything else.
        // An expired turn consumes this byte: the turn it addressed no
        // longer exists.
        let active_id = if is_turn { id } else { opponent_id };
        let expired = self
            .registry
            .get(active_id)
            .and_then(|active| active.clock)
            .is_some_and(|clock| clock.is_expired(now));
        if expired {
            return self.force_timeout(active_id, now);
        }

        // Chat mode absorbs every byte until its newline flush, even if
        // the turn changed underneath the speaker.
        if in_chat {
            return self.chat_byte(id, byte);
        }

        let command = Command::from_byte(byte);

        // Time queries are answered for either participant.
        if command == Some(Command::TimeLeft) {
            return self.query_time(id, active_id, now);
        }
        if !is_turn {
            return Vec::new();
        }
        match command {
            Some(Command::Attack) => {
                self.resolve_attack(id, opponent_id, AttackKind::Basic, now)
            }
            Some(Command::PowerMove) => {
                let powermoves =
                    self.registry.get(id).map_or(0, |s| s.powermoves);
                if powermoves == 0 {
                    // Refused without consuming the turn.
                    vec![Outbound::to(id, text::NO_POWER_MOVES)]
                } else {
                    self.resolve_attack(id, opponent_id, AttackKind::Power, now)
                }
            }
            Some(Command::Speak) => {
                if let Some(session) = self.registry.get_mut(id) {
                    session.begin_chat();
                }
                vec![Outbound::to(id, text::SPEAK_PROMPT)]
            }
            Some(Command::TimeLeft) | None => Vec::new(),
        }
    }

    fn chat_byte(&mut self, id: ConnectionId, byte: u8) -> Vec<Outbound> {
        let (name, opponent_id) = match self.registry.get(id) {
            Some(session) => (session.name.clone(), session.opponent),
            None => return Vec::new(),
        };
        let input = match self.registry.get_mut(id) {
            Some(session) => session.push_chat_byte(byte),
            None => return Vec::new(),
        };
        match input {
            ChatInput::Buffered => Vec::new(),
            ChatInput::OverflowWarning => {
                vec![Outbound::to(id, text::CHAT_OVERFLOW)]
            }
            ChatInput::Flush(flush) => {
                let mut out = Vec::new();
                match flush {
                    ChatFlush::Sent(message) => {
                        debug!(%id, len = message.len(), "chat delivered");
                        if let Some(opponent_id) = opponent_id {
                            out.push(Outbound::to(
                                opponent_id,
                                text::says(&name, &message),
                            ));
                        }
                    }
                    ChatFlush::TooLong => {
                        out.push(Outbound::to(id, text::CHAT_TOO_LONG));
                    }
                    ChatFlush::Empty => {
                        out.push(Outbound::to(id, text::CHAT_EMPTY));
                    }
                }
                // Leaving chat mode always refreshes the speaker's menu.
                out.extend(self.status_prompt_for(id));
                out
            }
        }
    }

    fn query_time(
        &self,
        id: ConnectionId,
        active_id: ConnectionId,
        now: Instant,
    ) -> Vec<Outbound> {
        let seconds = self
            .registry
            .get(active_id)
            .and_then(|active| active.clock)
            .map_or(self.config.turn_limit.as_secs(), |clock| {
                clock.remaining_secs(now)
            });
        vec![Outbound::to(id, text::remaining_time(seconds))]
    }

    // -----------------------------------------------------------------------
    // Attack resolution
    // -----------------------------------------------------------------------

    fn resolve_attack(
        &mut self,
        actor_id: ConnectionId,
        defender_id: ConnectionId,
        kind: AttackKind,
        now: Instant,
    ) -> Vec<Outbound> {
        let damage = match kind {
            AttackKind::Basic => self.roll_damage(),
            AttackKind::Power => {
                // A power move lands half the time; a landed one deals a
                // multiplied basic roll, a miss deals nothing.
                if self.rng.random_bool(0.5) {
                    self.roll_damage() * self.config.power_multiplier
                } else {
                    0
                }
            }
        };

        let actor_name = match self.registry.get(actor_id) {
            Some(actor) => actor.name.clone(),
            None => return Vec::new(),
        };
        let defender_name = match self.registry.get(defender_id) {
            Some(defender) => defender.name.clone(),
            None => return Vec::new(),
        };

        if matches!(kind, AttackKind::Power) {
            if let Some(actor) = self.registry.get_mut(actor_id) {
                actor.powermoves = actor.powermoves.saturating_sub(1);
            }
        }
        let defender_hitpoints = match self.registry.get_mut(defender_id) {
            Some(defender) => {
                defender.hitpoints -= damage;
                defender.hitpoints
            }
            None => return Vec::new(),
        };
        debug!(
            actor = %actor_id,
            defender = %defender_id,
            damage,
            defender_hitpoints,
            "attack resolved"
        );

        let mut out = vec![
            Outbound::to(actor_id, text::attack_dealt(&defender_name, damage)),
            Outbound::to(
                defender_id,
                text::attack_received(&actor_name, damage),
            ),
        ];
        if matches!(kind, AttackKind::Power) && damage == 0 {
            out.push(Outbound::to(actor_id, text::POWER_MISSED_SELF));
            out.push(Outbound::to(
                defender_id,
                text::power_missed(&actor_name),
            ));
        }

        if defender_hitpoints <= 0 {
            out.extend(self.finish_battle(actor_id, defender_id, now));
        } else {
            out.extend(self.pass_turn(actor_id, defender_id, now));
        }
        out
    }

    fn roll_damage(&mut self) -> i32 {
        self.rng
            .random_range(self.config.damage_min..=self.config.damage_max)
    }

    /// Hands the turn from `actor` to `defender` and prompts both sides.
    fn pass_turn(
        &mut self,
        actor_id: ConnectionId,
        defender_id: ConnectionId,
        now: Instant,
    ) -> Vec<Outbound> {
        let (actor_name, actor_hitpoints) = match self.registry.get(actor_id) {
            Some(actor) => (actor.name.clone(), actor.hitpoints),
            None => return Vec::new(),
        };
        if let Some(actor) = self.registry.get_mut(actor_id) {
            actor.is_turn = false;
            actor.clock = None;
        }
        let (defender_name, defender_hitpoints, defender_powermoves) =
            match self.registry.get_mut(defender_id) {
                Some(defender) => {
                    defender.is_turn = true;
                    defender.clock =
                        Some(TurnClock::start(now, self.config.turn_limit));
                    (
                        defender.name.clone(),
                        defender.hitpoints,
                        defender.powermoves,
                    )
                }
                None => return Vec::new(),
            };
        vec![
            Outbound::to(
                defender_id,
                text::your_turn_prompt(
                    defender_hitpoints,
                    defender_powermoves,
                    &actor_name,
                    actor_hitpoints,
                ),
            ),
            Outbound::to(actor_id, text::waiting_for(&defender_name)),
        ]
    }

    // -----------------------------------------------------------------------
    // Battle end
    // -----------------------------------------------------------------------

    fn finish_battle(
        &mut self,
        winner_id: ConnectionId,
        loser_id: ConnectionId,
        now: Instant,
    ) -> Vec<Outbound> {
        let winner_name = match self.registry.get(winner_id) {
            Some(winner) => winner.name.clone(),
            None => return Vec::new(),
        };
        let loser_name = match self.registry.get(loser_id) {
            Some(loser) => loser.name.clone(),
            None => return Vec::new(),
        };
        info!(winner = %winner_name, loser = %loser_name, "battle finished");

        let mut out = vec![
            Outbound::to(winner_id, text::victory(&loser_name)),
            Outbound::to(loser_id, text::defeat(&winner_name)),
        ];
        // Defeat records the mutual rematch-avoidance link.
        if let Some(winner) = self.registry.get_mut(winner_id) {
            winner.leave_battle(Some(loser_id));
        }
        if let Some(loser) = self.registry.get_mut(loser_id) {
            loser.leave_battle(Some(winner_id));
        }
        // Loser re-enters the arena first, winner is re-matchmade first.
        out.push(Outbound::broadcast(text::entered_arena(&loser_name)));
        out.push(Outbound::broadcast(text::entered_arena(&winner_name)));
        out.extend(self.rematch(winner_id, now));
        out.extend(self.rematch(loser_id, now));
        out
    }

    /// Tries to put a freshly unmatched player into a new battle.
    fn rematch(&mut self, id: ConnectionId, now: Instant) -> Vec<Outbound> {
        let Some(session) = self.registry.get(id) else {
            return Vec::new();
        };
        // Already re-paired as the other side of an earlier rematch.
        if session.battle.is_in_battle() {
            return Vec::new();
        }
        match find_opponent(&self.registry, id) {
            Some(opponent) => self.start_match(id, opponent, now),
            None => vec![Outbound::to(id, text::AWAITING_OPPONENT)],
        }
    }

    // -----------------------------------------------------------------------
    // Match start
    // -----------------------------------------------------------------------

    fn start_match(
        &mut self,
        a: ConnectionId,
        b: ConnectionId,
        now: Instant,
    ) -> Vec<Outbound> {
        let name_a = match self.registry.get(a) {
            Some(session) => session.name.clone(),
            None => return Vec::new(),
        };
        let name_b = match self.registry.get(b) {
            Some(session) => session.name.clone(),
            None => return Vec::new(),
        };

        let hitpoints_a = self.roll_hitpoints();
        let powermoves_a = self.roll_powermoves();
        let hitpoints_b = self.roll_hitpoints();
        let powermoves_b = self.roll_powermoves();
        let a_goes_first = self.rng.random_bool(0.5);

        if let Some(session) = self.registry.get_mut(a) {
            session.enter_battle(b, hitpoints_a, powermoves_a);
            session.is_turn = a_goes_first;
            if a_goes_first {
                session.clock =
                    Some(TurnClock::start(now, self.config.turn_limit));
            }
        }
        if let Some(session) = self.registry.get_mut(b) {
            session.enter_battle(a, hitpoints_b, powermoves_b);
            session.is_turn = !a_goes_first;
            if !a_goes_first {
                session.clock =
                    Some(TurnClock::start(now, self.config.turn_limit));
            }
        }
        let first = if a_goes_first { &name_a } else { &name_b };
        info!(
            player_a = %name_a,
            player_b = %name_b,
            %first,
            "match started"
        );

        vec![
            Outbound::to(a, text::MATCH_STARTED),
            Outbound::to(b, text::MATCH_STARTED),
            Outbound::to(a, text::matched(&name_b, a_goes_first)),
            Outbound::to(b, text::matched(&name_a, !a_goes_first)),
            Outbound::to(
                a,
                text::status_prompt(hitpoints_a, powermoves_a, hitpoints_b),
            ),
            Outbound::to(
                b,
                text::status_prompt(hitpoints_b, powermoves_b, hitpoints_a),
            ),
        ]
    }

    fn roll_hitpoints(&mut self) -> i32 {
        self.rng
            .random_range(self.config.hitpoints_min..=self.config.hitpoints_max)
    }

    fn roll_powermoves(&mut self) -> u8 {
        self.rng
            .random_range(self.config.powermoves_min..=self.config.powermoves_max)
    }

    // -----------------------------------------------------------------------
    // Timeout
    // -----------------------------------------------------------------------

    /// Forces the turn away from `active_id` with zero damage dealt.
    fn force_timeout(
        &mut self,
        active_id: ConnectionId,
        now: Instant,
    ) -> Vec<Outbound> {
        let (active_name, active_hitpoints, opponent_id) =
            match self.registry.get(active_id) {
                Some(active) => {
                    let Some(opponent_id) = active.opponent else {
                        return Vec::new();
                    };
                    (active.name.clone(), active.hitpoints, opponent_id)
                }
                None => return Vec::new(),
            };
        if let Some(active) = self.registry.get_mut(active_id) {
            active.is_turn = false;
            active.clock = None;
        }
        let (opponent_hitpoints, opponent_powermoves) =
            match self.registry.get_mut(opponent_id) {
                Some(opponent) => {
                    opponent.is_turn = true;
                    opponent.clock =
                        Some(TurnClock::start(now, self.config.turn_limit));
                    (opponent.hitpoints, opponent.powermoves)
                }
                None => return Vec::new(),
            };
        info!(player = %active_name, "turn expired, switching");

        vec![
            Outbound::to(opponent_id, text::timeout_opponent(&active_name)),
            Outbound::to(active_id, text::TIMEOUT_SELF),
            Outbound::to(
                opponent_id,
                text::status_prompt(
                    opponent_hitpoints,
                    opponent_powermoves,
                    active_hitpoints,
                ),
            ),
        ]
    }

    /// The standard menu for one player, from current battle state.
    fn status_prompt_for(&self, id: ConnectionId) -> Option<Outbound> {
        let session = self.registry.get(id)?;
        let opponent_hitpoints = session
            .opponent
            .and_then(|opponent_id| self.registry.get(opponent_id))
            .map_or(0, |opponent| opponent.hitpoints);
        Some(Outbound::to(
            id,
            text::status_prompt(
                session.hitpoints,
                session.powermoves,
                opponent_hitpoints,
            ),
        ))
    }
}
