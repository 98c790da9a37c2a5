//! Configuration for ssdbkv
//!
//! An [`Endpoint`] describes where and how a session connects. It is fixed
//! once a session is opened; changing it means opening again.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, SsdbError};

/// Default SSDB server port
pub const DEFAULT_PORT: u16 = 8888;

/// Connect timeout used when none (or zero) is configured
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Read timeout used when none is configured
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection parameters for one SSDB server
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    // -------------------------------------------------------------------------
    // Address
    // -------------------------------------------------------------------------
    /// Host name or IP address
    pub host: String,

    /// TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Timeouts
    // -------------------------------------------------------------------------
    /// Bound on establishing the TCP connection
    pub connect_timeout: Duration,

    /// Bound on waiting for a reply. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------
    /// Whether sessions for this endpoint should be pooled and reused
    pub persistent: bool,

    /// Pool key for persistent sessions; defaults to `host:port`
    pub persistent_id: Option<String>,

    /// Delay applied before a reconnect attempt
    pub retry_interval: Duration,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            persistent: false,
            persistent_id: None,
            retry_interval: Duration::ZERO,
        }
    }
}

impl Endpoint {
    /// Create a new endpoint builder
    pub fn builder() -> EndpointBuilder {
        EndpointBuilder::default()
    }

    /// `host:port` form used for resolution and logging
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Key under which persistent sessions for this endpoint are pooled
    pub fn persistence_key(&self) -> String {
        match &self.persistent_id {
            Some(id) => id.clone(),
            None => self.addr(),
        }
    }
}

/// Builder for Endpoint
#[derive(Default)]
pub struct EndpointBuilder {
    endpoint: Endpoint,
    connect_timeout_secs: Option<f64>,
    read_timeout_secs: Option<f64>,
}

impl EndpointBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.endpoint.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.endpoint.port = port;
        self
    }

    /// Set the connect timeout (in seconds, zero selects the default)
    pub fn connect_timeout(mut self, secs: f64) -> Self {
        self.connect_timeout_secs = Some(secs);
        self
    }

    /// Set the read timeout (in seconds, zero disables it)
    pub fn read_timeout(mut self, secs: f64) -> Self {
        self.read_timeout_secs = Some(secs);
        self
    }

    /// Mark sessions for this endpoint as persistent
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.endpoint.persistent = persistent;
        self
    }

    /// Set the pool key for persistent sessions (implies `persistent`)
    pub fn persistent_id(mut self, id: impl Into<String>) -> Self {
        self.endpoint.persistent = true;
        self.endpoint.persistent_id = Some(id.into());
        self
    }

    /// Set the delay before reconnect attempts (in milliseconds)
    pub fn retry_interval_ms(mut self, ms: u64) -> Self {
        self.endpoint.retry_interval = Duration::from_millis(ms);
        self
    }

    pub fn build(self) -> Result<Endpoint> {
        let mut endpoint = self.endpoint;

        if endpoint.host.is_empty() {
            return Err(SsdbError::Config("host must not be empty".to_string()));
        }

        if let Some(secs) = self.connect_timeout_secs {
            endpoint.connect_timeout = match parse_timeout(secs)? {
                Some(timeout) => timeout,
                None => DEFAULT_CONNECT_TIMEOUT,
            };
        }

        if let Some(secs) = self.read_timeout_secs {
            endpoint.read_timeout = parse_timeout(secs)?;
        }

        Ok(endpoint)
    }
}

/// Convert a timeout in seconds, treating zero as "no timeout".
pub(crate) fn parse_timeout(secs: f64) -> Result<Option<Duration>> {
    if !secs.is_finite() || secs < 0.0 || secs > i32::MAX as f64 {
        return Err(SsdbError::Config(format!("invalid timeout: {}", secs)));
    }
    if secs == 0.0 {
        return Ok(None);
    }
    Ok(Some(Duration::from_secs_f64(secs)))
}

/// Runtime options settable on a session with a string value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOption {
    /// Key prefix; an empty value clears it
    Prefix,

    /// Read timeout in seconds
    ReadTimeout,

    /// Serialization mode, by code (`0`, `1`, `2`) or name
    Serializer,
}

impl ClientOption {
    /// Numeric option code
    pub fn code(self) -> i64 {
        match self {
            ClientOption::Prefix => 1,
            ClientOption::ReadTimeout => 2,
            ClientOption::Serializer => 3,
        }
    }

    /// Look an option up by its numeric code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ClientOption::Prefix),
            2 => Some(ClientOption::ReadTimeout),
            3 => Some(ClientOption::Serializer),
            _ => None,
        }
    }
}

impl FromStr for ClientOption {
    type Err = SsdbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "prefix" => Ok(ClientOption::Prefix),
            "read_timeout" | "read-timeout" => Ok(ClientOption::ReadTimeout),
            "serializer" => Ok(ClientOption::Serializer),
            other => Err(SsdbError::Config(format!("unknown option: {}", other))),
        }
    }
}
