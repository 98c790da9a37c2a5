//! # ssdbkv
//!
//! A blocking client for the SSDB key-value server's text-block protocol:
//! - Block framing codec (`<len>\n<payload>\n`, frame ends with `\n`)
//! - Single-connection sessions with lazy connect and read timeouts
//! - Transparent key prefixing and pluggable value serialization
//! - Typed verbs for keys, hashes, sorted sets and queues
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client<S>                             │
//! │        (kv / hash / zset / queue verbs, projections)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Session                               │
//! │   (lazy connect, timeouts, prefixer, value codec, errors)    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Connection  │          │  Protocol   │
//!   │ (TcpStream) │          │  (framing)  │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ssdbkv::{Client, Endpoint};
//!
//! # fn main() -> ssdbkv::Result<()> {
//! let endpoint = Endpoint::builder().host("127.0.0.1").port(8888).build()?;
//! let mut client = Client::connect(endpoint)?;
//! client.set("greeting", "hello", None)?;
//! let value = client.get("greeting")?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod prefix;
pub mod value;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::Client;
pub use config::{ClientOption, Endpoint};
pub use error::{ConnError, IoError, Result, SsdbError};
pub use network::{ConnectionState, PooledSession, Session, SessionPool};
pub use protocol::{Command, Reply, Status};
pub use value::{SerializationMode, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ssdbkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
