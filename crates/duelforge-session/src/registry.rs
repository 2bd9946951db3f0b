//! The connection registry: all live sessions, in connection order.
//!
//! # Concurrency note
//!
//! `Registry` is NOT thread-safe and doesn't need to be: it is owned by
//! the single dispatcher task, and every mutation happens between two
//! awaits of that task. Keeping it a plain ordered map avoids hidden
//! locking.

use std::collections::HashMap;

use duelforge_transport::ConnectionId;

use crate::{Session, SessionError};

/// Insertion-ordered collection of sessions, keyed by connection id.
///
/// Order is irrelevant to game rules but observable: it is the broadcast
/// order and the matchmaking scan order (first eligible candidate wins).
/// The id list and the session map are kept in sync; [`Registry::ids`]
/// hands out a snapshot so callers may remove entries mid-traversal
/// without skipping or revisiting anyone.
#[derive(Debug, Default)]
pub struct Registry {
    /// Connection order; determines broadcast and matchmaking order.
    order: Vec<ConnectionId>,

    /// The sessions themselves, for O(1) lookup by id.
    sessions: HashMap<ConnectionId, Session>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session at the end of the order.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyRegistered`] if the id is taken —
    /// ids are never reused, so this means the registry is corrupt.
    pub fn add(&mut self, session: Session) -> Result<(), SessionError> {
        let id = session.id;
        if self.sessions.contains_key(&id) {
            return Err(SessionError::AlreadyRegistered(id));
        }
        self.order.push(id);
        self.sessions.insert(id, session);
        tracing::debug!(%id, total = self.order.len(), "session registered");
        Ok(())
    }

    /// Removes and returns a session. `None` if the id is unknown.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(&id)?;
        self.order.retain(|other| *other != id);
        tracing::debug!(%id, total = self.order.len(), "session removed");
        Some(session)
    }

    /// Looks up a session by connection id.
    pub fn get(&self, id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Mutable lookup by connection id.
    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Snapshot of all ids in connection order.
    ///
    /// Safe to iterate while removing entries from the registry.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.order.clone()
    }

    /// Ids of all name-confirmed sessions, in connection order.
    ///
    /// This is the broadcast recipient set.
    pub fn named_ids(&self) -> Vec<ConnectionId> {
        self.order
            .iter()
            .copied()
            .filter(|id| {
                self.sessions
                    .get(id)
                    .is_some_and(|s| s.name_confirmed)
            })
            .collect()
    }

    /// Finds the name-confirmed session with the given name.
    ///
    /// Unconfirmed sessions are invisible here: a half-typed name never
    /// blocks someone else from claiming it.
    pub fn find_by_name(&self, name: &str) -> Option<&Session> {
        self.order
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .find(|s| s.name_confirmed && s.name == name)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
