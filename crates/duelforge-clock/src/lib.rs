//! Turn-deadline bookkeeping and the low-frequency wake.
//!
//! Two small pieces of timing machinery:
//!
//! - [`TurnClock`] — a wall-clock deadline for the active player's turn.
//!   Pure data: callers pass `now` explicitly, so tests can simulate any
//!   clock without sleeping.
//! - [`Ticker`] — a low-frequency periodic wake designed to sit inside
//!   the dispatcher's `tokio::select!` loop. Turn expiry is *polled*,
//!   checked whenever a battle participant's input is dispatched; the
//!   ticker bounds the worst case so an idle turn still expires within
//!   one tick period instead of waiting for someone to press a key.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         event = events.recv() => { /* dispatch, checking deadlines */ }
//!         _ = ticker.tick() => { /* sweep expired turns */ }
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use tracing::debug;

// ---------------------------------------------------------------------------
// TurnClock
// ---------------------------------------------------------------------------

/// The deadline for one player's turn.
///
/// Created when a turn begins; the turn is forfeit once `now` passes the
/// deadline. `Instant` is monotonic, so system clock changes can't
/// shorten or extend a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnClock {
    deadline: Instant,
}

impl TurnClock {
    /// Starts a turn at `now` with the given time limit.
    pub fn start(now: Instant, limit: Duration) -> Self {
        Self {
            deadline: now + limit,
        }
    }

    /// Time remaining before the deadline, zero if already past.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// Whole seconds remaining, floored at 0 (what the `t` query reports).
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        self.remaining(now).as_secs()
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// A periodic wake for the dispatcher's select loop.
///
/// In disabled mode [`Ticker::tick`] pends forever — `select!` just
/// never takes that branch, leaving turn expiry to the input-polled
/// checks alone: an idle turn then waits for player input to expire.
pub struct Ticker {
    interval: Option<tokio::time::Interval>,
}

impl Ticker {
    /// A ticker that fires every `period`.
    pub fn every(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        // A late tick should not cause a burst of catch-up ticks;
        // expiry sweeps are idempotent over wall-clock time anyway.
        interval
            .set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        debug!(period_ms = period.as_millis() as u64, "ticker created");
        Self {
            interval: Some(interval),
        }
    }

    /// A ticker that never fires.
    pub fn disabled() -> Self {
        debug!("ticker created in disabled mode (input-polled expiry only)");
        Self { interval: None }
    }

    /// Waits for the next tick. Pends forever when disabled.
    pub async fn tick(&mut self) {
        match &mut self.interval {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
