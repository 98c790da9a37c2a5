//! Value Module
//!
//! Application values and the codec that turns them into stored bytes.
//!
//! ## Serialization Modes
//! - `None`: values must already be byte strings, stored as-is
//! - `NativeStructured`: self-describing JSON encoding
//! - `CompactBinary`: bincode encoding
//!
//! The mode is fixed per session and applies to every value it writes and
//! reads. Bytes written under one mode are not readable under another.

mod codec;
mod types;

pub use codec::{default_mode, set_default_mode, SerializationMode, ValueCodec};
pub use types::Value;
