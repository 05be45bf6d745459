//! Per-browser-session UI state with idle expiry.

use crate::{DemoId, ParameterStore};
use fn_core::BaseKind;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Opaque session identifier: 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn from_u128(raw: u128) -> Self {
        Self(format!("{raw:032x}"))
    }

    /// Accepts only well-formed identifiers, so cookie contents never become
    /// map keys verbatim.
    pub fn parse(s: &str) -> Option<Self> {
        let well_formed = s.len() == 32
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything one browser session remembers between re-runs.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    active_demo: DemoId,
    base_kind: BaseKind,
    store: ParameterStore,
}

impl SessionState {
    pub fn active_demo(&self) -> DemoId {
        self.active_demo
    }

    pub fn set_active_demo(&mut self, demo: DemoId) {
        self.active_demo = demo;
    }

    pub fn base_kind(&self) -> BaseKind {
        self.base_kind
    }

    /// Switching kinds only changes which coefficient group is shown and
    /// evaluated; the coefficients of every kind are kept.
    pub fn set_base_kind(&mut self, kind: BaseKind) {
        self.base_kind = kind;
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ParameterStore {
        &mut self.store
    }
}

struct SessionEntry {
    state: SessionState,
    last_seen: Instant,
}

/// All live sessions. A session idle for longer than `ttl` is discarded
/// together with its parameters.
pub struct SessionRegistry {
    sessions: HashMap<SessionId, SessionEntry>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// True if `id` names a session that has not expired at `now`.
    pub fn contains(&self, id: &SessionId, now: Instant) -> bool {
        self.sessions
            .get(id)
            .is_some_and(|e| now.saturating_duration_since(e.last_seen) <= self.ttl)
    }

    /// Returns the session state, creating it with defaults when absent or
    /// expired, and marks it as seen at `now`.
    pub fn session(&mut self, id: &SessionId, now: Instant) -> &mut SessionState {
        let ttl = self.ttl;
        let entry = self.sessions.entry(id.clone()).or_insert_with(|| {
            tracing::debug!(session = %id, "new session");
            SessionEntry {
                state: SessionState::default(),
                last_seen: now,
            }
        });
        if now.saturating_duration_since(entry.last_seen) > ttl {
            tracing::debug!(session = %id, "session expired, starting fresh");
            entry.state = SessionState::default();
        }
        entry.last_seen = now;
        &mut entry.state
    }

    /// Drops every session idle for longer than the TTL. Returns how many
    /// were removed.
    pub fn evict_idle(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, e| now.saturating_duration_since(e.last_seen) <= ttl);
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.sessions.len(), "evicted idle sessions");
        }
        evicted
    }
}
