//! Network Module
//!
//! TCP transport and session management.
//!
//! ## Architecture
//! - `Connection`: one TCP stream with buffered reader/writer halves
//! - `Session`: owns zero or one connection, handles lazy connect,
//!   timeouts and teardown, and runs one command at a time
//! - `SessionPool`: reuses connected sessions for persistent endpoints

mod connection;
mod pool;
mod session;

pub use connection::Connection;
pub use pool::{PooledSession, SessionPool, DEFAULT_MAX_IDLE};
pub use session::{ConnectionState, Session};
