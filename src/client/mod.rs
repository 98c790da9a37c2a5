//! Client Module
//!
//! Typed SSDB verbs over a [`Session`].
//!
//! Each verb validates its arguments, applies the session's key prefix and
//! value codec to the arguments that need them, runs one round trip, and
//! projects the reply into the verb's result type.
//!
//! ## Verb Families
//! - `kv`: plain keys (`get`, `set`, `scan`, `multi_set`, ...)
//! - `hash`: hashes (`hset`, `hgetall`, ...)
//! - `zset`: sorted sets with integer scores (`zset`, `zrange`, ...)
//! - `queue`: lists/queues (`qpush`, `qpop`, ...)
//!
//! ## Prefixing
//! Top-level names (keys, hash names, zset names, queue names) carry the
//! prefix. Hash fields, zset members and queue items never do, and are
//! returned unstripped.

mod hash;
mod kv;
mod queue;
mod zset;

use std::borrow::BorrowMut;

use bytes::Bytes;

use crate::config::{ClientOption, Endpoint};
use crate::error::{Result, SsdbError};
use crate::network::{PooledSession, Session, SessionPool};
use crate::protocol::{build_batch, BatchItems, BatchSpec, Command, Reply};
use crate::value::{SerializationMode, Value};

/// SSDB client over an owned, pooled, or borrowed session
pub struct Client<S: BorrowMut<Session> = Session> {
    session: S,
}

impl Client<Session> {
    /// Connect now
    pub fn connect(endpoint: Endpoint) -> Result<Self> {
        Ok(Self::from_session(Session::connect(endpoint)?))
    }

    /// Connect on first command
    pub fn connect_lazy(endpoint: Endpoint) -> Result<Self> {
        Ok(Self::from_session(Session::connect_lazy(endpoint)?))
    }
}

impl Client<PooledSession> {
    /// Check a session out of the process-wide pool
    pub fn connect_persistent(endpoint: &Endpoint) -> Result<Self> {
        Ok(Self::from_session(SessionPool::global().checkout(endpoint)?))
    }
}

impl<S: BorrowMut<Session>> Client<S> {
    pub fn from_session(session: S) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        self.session.borrow()
    }

    pub fn session_mut(&mut self) -> &mut Session {
        self.session.borrow_mut()
    }

    pub fn into_inner(self) -> S {
        self.session
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn set_prefix(&mut self, prefix: impl AsRef<[u8]>) {
        self.session_mut().set_prefix(prefix);
    }

    pub fn set_serialization_mode(&mut self, mode: SerializationMode) {
        self.session_mut().set_serialization_mode(mode);
    }

    pub fn set_read_timeout(&mut self, secs: f64) -> Result<()> {
        self.session_mut().set_read_timeout(secs)
    }

    pub fn set_option(&mut self, option: ClientOption, value: &str) -> Result<()> {
        self.session_mut().set_option(option, value)
    }

    pub fn option(&self, option: ClientOption) -> String {
        self.session().option(option)
    }

    pub fn close(&mut self) {
        self.session_mut().close();
    }

    // =========================================================================
    // Connection
    // =========================================================================

    /// Authenticate the connection
    pub fn auth(&mut self, password: impl AsRef<[u8]>) -> Result<bool> {
        let password = non_empty(password.as_ref(), "password")?;
        self.exec(Command::new("auth").arg(password))?.as_bool()
    }

    /// Send an arbitrary command and return the raw reply
    pub fn raw(&mut self, command: &Command) -> Result<Reply> {
        self.session_mut().call(command)
    }

    // =========================================================================
    // Argument helpers
    // =========================================================================

    fn exec(&mut self, command: Command) -> Result<Reply> {
        self.session_mut().call(&command)
    }

    /// Validate and prefix a top-level key
    fn key(&self, key: &[u8]) -> Result<Bytes> {
        let key = non_empty(key, "key")?;
        Ok(Bytes::from(self.session().prefixer().apply(key).into_owned()))
    }

    /// Prefix a range boundary; an empty boundary is sent empty
    fn bound(&self, key: &[u8]) -> Bytes {
        if key.is_empty() {
            return Bytes::new();
        }
        Bytes::from(self.session().prefixer().apply(key).into_owned())
    }

    /// Validate and encode a stored value
    fn value(&self, value: &Value) -> Result<Bytes> {
        if value.is_empty_bytes() {
            return Err(SsdbError::invalid("value must not be empty"));
        }
        self.session().codec().encode(value)
    }

    fn batch(
        &mut self,
        spec: &BatchSpec,
        leading_key: Option<&[u8]>,
        items: BatchItems<'_>,
    ) -> Result<Reply> {
        if items.is_empty() {
            return Err(SsdbError::invalid(format!("{}: no items", spec.verb)));
        }
        if let Some(key) = leading_key {
            non_empty(key, "name")?;
        }
        let session = self.session();
        let command = build_batch(spec, leading_key, items, session.prefixer(), session.codec())?;
        self.exec(command)
    }
}

fn non_empty<'a>(arg: &'a [u8], what: &str) -> Result<&'a [u8]> {
    if arg.is_empty() {
        return Err(SsdbError::invalid(format!("{} must not be empty", what)));
    }
    Ok(arg)
}

fn positive(n: i64, what: &str) -> Result<i64> {
    if n <= 0 {
        return Err(SsdbError::invalid(format!("{} must be positive, got {}", what, n)));
    }
    Ok(n)
}
