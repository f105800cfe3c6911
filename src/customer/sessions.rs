// Session store for the Customer Database
// Sliding-expiry sessions keyed by an unguessable token

use crate::error::{MarketError, MarketResult};
use crate::protocol::{PrincipalId, PrincipalKind, SessionId, SessionInfo};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// One live session
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: SessionId,
    pub principal_id: PrincipalId,
    pub kind: PrincipalKind,
    pub created_at: DateTime<Utc>,

    /// Monotonic; the only clock consulted for expiry
    pub last_active_at: Instant,
}

impl Session {
    fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_active_at) >= timeout
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            principal_id: self.principal_id,
            kind: self.kind,
        }
    }
}

/// Outcome of one expiry sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub evicted: usize,
    pub remaining: usize,
    pub tombstones_pruned: usize,
}

/// Concurrent session table.
///
/// Every read-modify-write of `last_active_at` happens under the DashMap shard
/// lock for that session, and the sweeper checks expiry under the same lock,
/// so a refresh and an eviction of one session can never interleave.
pub struct SessionStore {
    sessions: DashMap<SessionId, Session>,

    /// Ids of expired sessions, with the time they were found expired
    tombstones: DashMap<SessionId, Instant>,

    timeout: Duration,
    tombstone_retention: Duration,
}

impl SessionStore {
    pub fn new(timeout: Duration, tombstone_retention: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            tombstones: DashMap::new(),
            timeout,
            tombstone_retention,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue a new session for `principal_id`.
    /// Prior sessions of the same principal stay valid.
    pub fn create(&self, principal_id: PrincipalId, kind: PrincipalKind) -> SessionId {
        let session_id = SessionId::generate();
        let session = Session {
            session_id,
            principal_id,
            kind,
            created_at: Utc::now(),
            last_active_at: Instant::now(),
        };
        self.sessions.insert(session_id, session);

        info!(session_id = %session_id, principal_id = %principal_id, kind = %kind, "Session created");
        session_id
    }

    /// Confirm a session is live and refresh its activity time.
    /// When `expected` is given, the session must belong to that kind of principal.
    pub fn validate(
        &self,
        session_id: SessionId,
        expected: Option<PrincipalKind>,
    ) -> MarketResult<SessionInfo> {
        let now = Instant::now();

        if let Some(mut session) = self.sessions.get_mut(&session_id) {
            if !session.is_expired(now, self.timeout) {
                if let Some(expected) = expected {
                    if session.kind != expected {
                        return Err(MarketError::WrongPrincipalKind {
                            expected,
                            actual: session.kind,
                        });
                    }
                }
                session.last_active_at = now;
                return Ok(session.info());
            }
        } else if self.tombstones.contains_key(&session_id) {
            return Err(MarketError::SessionExpired);
        } else {
            return Err(MarketError::SessionNotFound);
        }

        // Shard guard released above; found stale
        self.expire(session_id, now);
        Err(MarketError::SessionExpired)
    }

    /// Delete a session. A second logout of the same id reports SessionNotFound.
    pub fn logout(&self, session_id: SessionId) -> MarketResult<()> {
        let now = Instant::now();

        match self.sessions.remove(&session_id) {
            Some((_, session)) if session.is_expired(now, self.timeout) => {
                self.tombstones.insert(session_id, now);
                Err(MarketError::SessionExpired)
            }
            Some((_, session)) => {
                info!(
                    session_id = %session_id,
                    principal_id = %session.principal_id,
                    logged_in_at = %session.created_at,
                    "Session logged out"
                );
                Ok(())
            }
            None if self.tombstones.contains_key(&session_id) => Err(MarketError::SessionExpired),
            None => Err(MarketError::SessionNotFound),
        }
    }

    /// Evict every session idle for at least the timeout, and prune old tombstones
    pub fn sweep(&self) -> SweepReport {
        let now = Instant::now();
        let mut evicted = 0;

        self.sessions.retain(|session_id, session| {
            if session.is_expired(now, self.timeout) {
                self.tombstones.insert(*session_id, now);
                evicted += 1;
                false
            } else {
                true
            }
        });

        let before = self.tombstones.len();
        self.tombstones
            .retain(|_, expired_at| now.saturating_duration_since(*expired_at) < self.tombstone_retention);
        let tombstones_pruned = before.saturating_sub(self.tombstones.len());

        SweepReport {
            evicted,
            remaining: self.sessions.len(),
            tombstones_pruned,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Tombstone first, then remove, so concurrent validators never see neither
    fn expire(&self, session_id: SessionId, now: Instant) {
        self.tombstones.insert(session_id, now);
        let timeout = self.timeout;
        if self
            .sessions
            .remove_if(&session_id, |_, session| session.is_expired(now, timeout))
            .is_some()
        {
            debug!(session_id = %session_id, "Session expired on access");
        }
    }
}
