//! Persistent session pool
//!
//! Keeps idle connected sessions keyed by the endpoint's persistence key,
//! so short-lived clients can reuse a TCP connection instead of opening a
//! new one per use.

use std::borrow::{Borrow, BorrowMut};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use super::Session;
use crate::config::Endpoint;
use crate::error::Result;

/// Default number of idle sessions kept per key
pub const DEFAULT_MAX_IDLE: usize = 8;

struct PoolInner {
    idle: Mutex<HashMap<String, Vec<Session>>>,
    max_idle: usize,
}

/// Pool of reusable sessions
#[derive(Clone)]
pub struct SessionPool {
    inner: Arc<PoolInner>,
}

impl Default for SessionPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

impl SessionPool {
    /// Create a pool keeping at most `max_idle` idle sessions per key
    pub fn new(max_idle: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(HashMap::new()),
                max_idle,
            }),
        }
    }

    /// Process-wide pool used for endpoints marked persistent
    pub fn global() -> &'static SessionPool {
        static GLOBAL: OnceLock<SessionPool> = OnceLock::new();
        GLOBAL.get_or_init(SessionPool::default)
    }

    /// Reuse an idle connected session for `endpoint`, or open a new one.
    ///
    /// A reused session starts from the endpoint's read timeout, no prefix
    /// and the process-wide serialization mode, whatever its last user set.
    pub fn checkout(&self, endpoint: &Endpoint) -> Result<PooledSession> {
        let key = endpoint.persistence_key();

        if let Some(mut session) = self.pop_idle(&key) {
            match session.reset_options() {
                Ok(()) => {
                    tracing::debug!("Reusing pooled session for {}", key);
                    return Ok(PooledSession::new(self.inner.clone(), key, session));
                }
                Err(e) => tracing::debug!("Discarding pooled session for {}: {}", key, e),
            }
        }

        tracing::debug!("Opening new pooled session for {}", key);
        let session = Session::connect(endpoint.clone())?;
        Ok(PooledSession::new(self.inner.clone(), key, session))
    }

    /// Number of idle sessions held for `key`
    pub fn idle_count(&self, key: &str) -> usize {
        self.inner.idle.lock().get(key).map_or(0, Vec::len)
    }

    /// Close and discard every idle session
    pub fn clear(&self) {
        self.inner.idle.lock().clear();
    }

    fn pop_idle(&self, key: &str) -> Option<Session> {
        let mut idle = self.inner.idle.lock();
        let sessions = idle.get_mut(key)?;
        // Sessions are only returned while connected with no reply owed, but
        // a peer may have hung up since; those are discovered on first use.
        while let Some(session) = sessions.pop() {
            if session.is_connected() && !session.has_pending_reply() {
                return Some(session);
            }
        }
        None
    }
}

/// A session checked out of a [`SessionPool`].
///
/// Returned to the pool on drop if it is still connected and no reply is
/// owed on its connection. A session dropped right after a read timeout is
/// closed instead, so its late reply never reaches another user.
pub struct PooledSession {
    pool: Arc<PoolInner>,
    key: String,
    session: Option<Session>,
}

impl PooledSession {
    fn new(pool: Arc<PoolInner>, key: String, session: Session) -> Self {
        Self {
            pool,
            key,
            session: Some(session),
        }
    }

    /// Take the session out of the pool for good
    pub fn detach(mut self) -> Session {
        match self.session.take() {
            Some(session) => session,
            None => unreachable!("pooled session is only emptied on drop or detach"),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Deref for PooledSession {
    type Target = Session;

    fn deref(&self) -> &Session {
        match &self.session {
            Some(session) => session,
            None => unreachable!("pooled session is only emptied on drop or detach"),
        }
    }
}

impl DerefMut for PooledSession {
    fn deref_mut(&mut self) -> &mut Session {
        match &mut self.session {
            Some(session) => session,
            None => unreachable!("pooled session is only emptied on drop or detach"),
        }
    }
}

impl Borrow<Session> for PooledSession {
    fn borrow(&self) -> &Session {
        self
    }
}

impl BorrowMut<Session> for PooledSession {
    fn borrow_mut(&mut self) -> &mut Session {
        self
    }
}

impl Drop for PooledSession {
    fn drop(&mut self) {
        let session = match self.session.take() {
            Some(session) => session,
            None => return,
        };
        if !session.is_connected() {
            return;
        }
        if session.has_pending_reply() {
            tracing::debug!("Closing pooled session for {} with a reply pending", self.key);
            return;
        }
        let mut idle = self.pool.idle.lock();
        let sessions = idle.entry(self.key.clone()).or_default();
        if sessions.len() < self.pool.max_idle {
            sessions.push(session);
        }
    }
}
