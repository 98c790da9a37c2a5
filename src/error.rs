//! Error types for ssdbkv
//!
//! Every failure in the engine surfaces through [`SsdbError`]. Transport
//! failures are split into [`ConnError`] (no usable connection) and
//! [`IoError`] (a round trip went wrong), because they leave the session
//! in different states.

use std::io;

use thiserror::Error;

use crate::protocol::Status;

/// Result type alias using SsdbError
pub type Result<T> = std::result::Result<T, SsdbError>;

/// Unified error type for ssdbkv operations
#[derive(Debug, Error)]
pub enum SsdbError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connection error: {0}")]
    Conn(#[from] ConnError),

    #[error("IO error: {0}")]
    Io(#[from] IoError),

    // -------------------------------------------------------------------------
    // Payload Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Codec error: {0}")]
    Codec(String),

    /// The server answered with `error`, `fail` or `client_error`.
    #[error("Server replied {status}: {message}")]
    Server { status: Status, message: String },

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// No connection could be established, or none was present.
#[derive(Debug, Error)]
pub enum ConnError {
    #[error("failed to resolve {addr}: {source}")]
    Resolve { addr: String, source: io::Error },

    #[error("{addr} resolved to no addresses")]
    NoAddress { addr: String },

    #[error("failed to connect to {addr}: {source}")]
    Connect { addr: String, source: io::Error },

    #[error("session is not connected")]
    NotConnected,
}

/// A read or write on a live connection failed.
#[derive(Debug, Error)]
pub enum IoError {
    /// The read timeout elapsed. The session stays connected.
    #[error("read timed out")]
    Timeout,

    /// Any other transport failure. The session is invalidated.
    #[error("transport failure: {0}")]
    Fatal(io::Error),
}

impl From<io::Error> for SsdbError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            // Unix reports an expired SO_RCVTIMEO as WouldBlock, Windows as TimedOut
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                SsdbError::Io(IoError::Timeout)
            }
            _ => SsdbError::Io(IoError::Fatal(err)),
        }
    }
}

impl SsdbError {
    /// True for errors after which the session no longer owns a transport.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SsdbError::Io(IoError::Fatal(_)))
    }

    /// True when the error is a read timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SsdbError::Io(IoError::Timeout))
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SsdbError::InvalidArgument(message.into())
    }
}
