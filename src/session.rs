//! Registry of connected client sessions.
//!
//! The transport assigns each connection a small numeric [`SessionId`].
//! The registry tracks which ids are live, caps concurrency at
//! [`MAX_SESSIONS`], and fans a payload out to every member.
//!
//! Delivery failures are logged and mark the session unhealthy, but never
//! remove it. Only a transport-reported disconnect removes a session.

use heapless::Vec;
use log::{debug, warn};

use crate::app::ports::TransportPort;

/// Maximum number of concurrently connected sessions.
pub const MAX_SESSIONS: usize = 5;

/// Transport-assigned connection identifier.
pub type SessionId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Session {
    id: SessionId,
    /// Cleared when the last delivery attempt failed.
    healthy: bool,
}

/// Set of active sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<Session, MAX_SESSIONS>,
}

impl SessionRegistry {
    pub const fn new() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }

    /// Register a newly connected session.
    ///
    /// Returns `false` if `id` is already registered or the registry is full.
    pub fn on_connect(&mut self, id: SessionId) -> bool {
        if self.contains(id) {
            debug!("session {} already registered", id);
            return false;
        }
        if self.sessions.push(Session { id, healthy: true }).is_err() {
            warn!("session {} rejected: {} sessions active", id, MAX_SESSIONS);
            return false;
        }
        true
    }

    /// Remove a session. Returns `false` for an unknown id.
    pub fn on_disconnect(&mut self, id: SessionId) -> bool {
        match self.sessions.iter().position(|s| s.id == id) {
            Some(idx) => {
                self.sessions.swap_remove(idx);
                true
            }
            None => {
                debug!("disconnect for unknown session {}", id);
                false
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.iter().any(|s| s.id == id)
    }

    /// Whether the last delivery to `id` succeeded. `None` if not registered.
    pub fn is_healthy(&self, id: SessionId) -> Option<bool> {
        self.sessions.iter().find(|s| s.id == id).map(|s| s.healthy)
    }

    pub fn ids(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.sessions.iter().map(|s| s.id)
    }

    /// Send `payload` to every session. Returns how many deliveries
    /// succeeded.
    pub fn broadcast(&mut self, payload: &str, transport: &mut impl TransportPort) -> usize {
        let mut delivered = 0;
        for session in self.sessions.iter_mut() {
            match transport.send_text(session.id, payload) {
                Ok(()) => {
                    session.healthy = true;
                    delivered += 1;
                }
                Err(e) => {
                    session.healthy = false;
                    warn!("delivery to session {} failed: {}", session.id, e);
                }
            }
        }
        delivered
    }
}
