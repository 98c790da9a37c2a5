//! Session
//!
//! Owns at most one connection to one endpoint and runs commands over it.
//!
//! ## Connection States
//! ```text
//!             open(lazy)                first use
//!   Disconnected ────────► LazyPending ────────────► Connected
//!        ▲   │                  │                        │
//!        │   └──── open ────────┼───────────────────────►│
//!        │                      │ connect fails          │
//!        └──────────────────────┴────────────────────────┘
//!               close / fatal I/O error / connect failure
//! ```
//!
//! ## Failure Policy
//! - A read timeout before any byte of the reply arrived leaves the session
//!   connected. The server may still have executed the command, so retrying
//!   a non-idempotent command after a timeout can apply it twice.
//! - The late reply to a timed-out command is still owed on the wire. `call`
//!   reads and discards it before sending the next command; if it has still
//!   not arrived, that call times out too and nothing new is sent. Callers
//!   driving `write_frame`/`read_frame` by hand get no such help: their next
//!   `read_frame` returns the late reply unless they `reconnect` first.
//! - A timeout partway through a reply frame is fatal, since the stream can
//!   no longer be resynchronized.
//! - Any other I/O failure drops the connection. The session then stays
//!   disconnected until `open` or `reconnect` is called.
//!
//! Every I/O method takes `&mut self`, so one session never has two
//! commands in flight. Share a session across threads behind a lock.

use std::thread;
use std::time::Duration;

use bytes::Bytes;

use super::Connection;
use crate::config::{parse_timeout, ClientOption, Endpoint};
use crate::error::{ConnError, IoError, Result, SsdbError};
use crate::prefix::KeyPrefixer;
use crate::protocol::{Command, Reply};
use crate::value::{default_mode, SerializationMode, ValueCodec};

/// Public view of the connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    LazyPending,
    Connected,
}

enum Transport {
    Disconnected,
    LazyPending,
    Connected(Connection),
}

/// A single-connection SSDB session
pub struct Session {
    /// Set by the first `open`; kept across disconnects for `reconnect`
    endpoint: Option<Endpoint>,

    transport: Transport,

    read_timeout: Option<Duration>,

    prefixer: KeyPrefixer,

    codec: ValueCodec,

    last_error: Option<String>,

    /// A command was written and its reply has not been fully read
    awaiting_reply: bool,

    /// Number of TCP connects attempted over the session's lifetime
    connect_attempts: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a disconnected session using the process-wide serialization mode
    pub fn new() -> Self {
        Self {
            endpoint: None,
            transport: Transport::Disconnected,
            read_timeout: None,
            prefixer: KeyPrefixer::default(),
            codec: ValueCodec::new(default_mode()),
            last_error: None,
            awaiting_reply: false,
            connect_attempts: 0,
        }
    }

    /// Create a session and connect it now
    pub fn connect(endpoint: Endpoint) -> Result<Self> {
        let mut session = Self::new();
        session.open(endpoint, false)?;
        Ok(session)
    }

    /// Create a session that connects on first use
    pub fn connect_lazy(endpoint: Endpoint) -> Result<Self> {
        let mut session = Self::new();
        session.open(endpoint, true)?;
        Ok(session)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the session against `endpoint`, replacing any current connection.
    ///
    /// With `lazy` the network is not touched until the first command.
    pub fn open(&mut self, endpoint: Endpoint, lazy: bool) -> Result<()> {
        self.close();
        self.read_timeout = endpoint.read_timeout;
        self.endpoint = Some(endpoint);

        if lazy {
            tracing::debug!("Session for {} will connect on first use", self.addr());
            self.transport = Transport::LazyPending;
            return Ok(());
        }

        let result = self.establish();
        self.track(result)
    }

    /// Make sure a connection exists, performing a pending lazy connect.
    ///
    /// A disconnected session is not reopened here.
    pub fn ensure_connected(&mut self) -> Result<()> {
        match self.transport {
            Transport::Connected(_) => Ok(()),
            Transport::LazyPending => {
                tracing::debug!("Performing deferred connect to {}", self.addr());
                let result = self.establish();
                self.track(result)
            }
            Transport::Disconnected => {
                let result = Err(ConnError::NotConnected.into());
                self.track(result)
            }
        }
    }

    /// Drop the connection and open it again with the stored endpoint.
    ///
    /// Sleeps for the endpoint's retry interval first, if one is set.
    pub fn reconnect(&mut self) -> Result<()> {
        let endpoint = match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => return self.track(Err(ConnError::NotConnected.into())),
        };
        self.close();
        if !endpoint.retry_interval.is_zero() {
            thread::sleep(endpoint.retry_interval);
        }
        tracing::debug!("Reconnecting to {}", endpoint.addr());
        let result = self.establish();
        self.track(result)
    }

    /// Release the connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Transport::Connected(conn) = &self.transport {
            tracing::debug!("Closing connection to {}", conn.peer_addr());
        }
        self.transport = Transport::Disconnected;
        self.awaiting_reply = false;
    }

    fn establish(&mut self) -> Result<()> {
        self.transport = Transport::Disconnected;
        self.awaiting_reply = false;
        let endpoint = match &self.endpoint {
            Some(endpoint) => endpoint,
            None => return Err(ConnError::NotConnected.into()),
        };

        self.connect_attempts += 1;
        let conn = Connection::open(endpoint)?;
        conn.set_read_timeout(self.read_timeout)
            .map_err(|e| SsdbError::Io(IoError::Fatal(e)))?;

        tracing::debug!("Connected to {}", conn.peer_addr());
        self.transport = Transport::Connected(conn);
        Ok(())
    }

    // =========================================================================
    // Round trips
    // =========================================================================

    /// Write one encoded frame. A failed write drops the connection.
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let result = match &mut self.transport {
            Transport::Connected(conn) => conn
                .write_frame(frame)
                .map_err(|e| SsdbError::Io(IoError::Fatal(e))),
            _ => Err(ConnError::NotConnected.into()),
        };
        let result = self.track(result);
        if result.is_ok() {
            self.awaiting_reply = true;
        }
        result
    }

    /// Read one reply frame.
    ///
    /// A timeout before the first byte leaves the connection in place; a
    /// timeout mid-frame and other I/O failures drop it.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        let result = match &mut self.transport {
            Transport::Connected(conn) => conn.read_frame(),
            _ => Err(ConnError::NotConnected.into()),
        };
        let result = self.track(result);
        if result.is_ok() {
            self.awaiting_reply = false;
        }
        result
    }

    /// Send a command and decode its reply.
    ///
    /// A reply still owed for an earlier timed-out command is read and
    /// discarded first.
    pub fn call(&mut self, command: &Command) -> Result<Reply> {
        let frame = command.encode()?;
        self.ensure_connected()?;

        if self.awaiting_reply {
            let late = self.read_frame()?;
            tracing::debug!(bytes = late.len(), "Discarded late reply from {}", self.addr());
        }

        tracing::trace!(verb = command.verb(), args = command.args().len(), "Sending command");
        self.write_frame(&frame)?;
        let reply = self.read_frame()?;

        let reply = Reply::parse(reply);
        if let Ok(reply) = &reply {
            tracing::trace!(
                verb = command.verb(),
                status = %reply.status(),
                blocks = reply.blocks().len(),
                "Received reply"
            );
        }
        self.track(reply)
    }

    /// Record the error (if any) and invalidate the connection on fatal I/O.
    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_fatal() {
                tracing::warn!("Dropping connection to {}: {}", self.addr(), err);
                self.transport = Transport::Disconnected;
                self.awaiting_reply = false;
            }
            self.last_error = Some(err.to_string());
        }
        result
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the read timeout in seconds (zero disables it).
    ///
    /// Applied to the live connection immediately, otherwise on next connect.
    pub fn set_read_timeout(&mut self, secs: f64) -> Result<()> {
        let timeout = parse_timeout(secs)?;
        self.read_timeout = timeout;
        let result = match &self.transport {
            Transport::Connected(conn) => conn
                .set_read_timeout(timeout)
                .map_err(|e| SsdbError::Io(IoError::Fatal(e))),
            _ => Ok(()),
        };
        self.track(result)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Set the key prefix; an empty prefix disables prefixing
    pub fn set_prefix(&mut self, prefix: impl AsRef<[u8]>) {
        self.prefixer = KeyPrefixer::new(prefix);
    }

    pub fn prefix(&self) -> &[u8] {
        self.prefixer.prefix()
    }

    pub fn prefixer(&self) -> &KeyPrefixer {
        &self.prefixer
    }

    pub fn set_serialization_mode(&mut self, mode: SerializationMode) {
        self.codec = ValueCodec::new(mode);
    }

    pub fn serialization_mode(&self) -> SerializationMode {
        self.codec.mode()
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    /// Set an option from its string form.
    ///
    /// A rejected value leaves the current setting unchanged.
    pub fn set_option(&mut self, option: ClientOption, value: &str) -> Result<()> {
        match option {
            ClientOption::Prefix => {
                self.set_prefix(value);
                Ok(())
            }
            ClientOption::ReadTimeout => {
                let secs = value.trim().parse::<f64>().map_err(|_| {
                    SsdbError::Config(format!("invalid read timeout: {:?}", value))
                })?;
                self.set_read_timeout(secs)
            }
            ClientOption::Serializer => {
                let mode = value.parse::<SerializationMode>()?;
                self.set_serialization_mode(mode);
                Ok(())
            }
        }
    }

    /// Current value of an option in string form
    pub fn option(&self, option: ClientOption) -> String {
        match option {
            ClientOption::Prefix => String::from_utf8_lossy(self.prefix()).into_owned(),
            ClientOption::ReadTimeout => self
                .read_timeout
                .map(|t| t.as_secs_f64())
                .unwrap_or(0.0)
                .to_string(),
            ClientOption::Serializer => self.serialization_mode().code().to_string(),
        }
    }

    /// Restore the endpoint's read timeout, an empty prefix and the
    /// process-wide serialization mode.
    pub fn reset_options(&mut self) -> Result<()> {
        self.prefixer = KeyPrefixer::default();
        self.codec = ValueCodec::new(default_mode());

        let timeout = self.endpoint.as_ref().and_then(|e| e.read_timeout);
        self.read_timeout = timeout;
        let result = match &self.transport {
            Transport::Connected(conn) => conn
                .set_read_timeout(timeout)
                .map_err(|e| SsdbError::Io(IoError::Fatal(e))),
            _ => Ok(()),
        };
        self.track(result)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    pub fn state(&self) -> ConnectionState {
        match self.transport {
            Transport::Disconnected => ConnectionState::Disconnected,
            Transport::LazyPending => ConnectionState::LazyPending,
            Transport::Connected(_) => ConnectionState::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.transport, Transport::Connected(_))
    }

    /// Whether a written command's reply has not been read yet
    pub fn has_pending_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts
    }

    /// Message of the most recent failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_last_error(&mut self) {
        self.last_error = None;
    }

    fn addr(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.addr(),
            None => "<unopened>".to_string(),
        }
    }
}
