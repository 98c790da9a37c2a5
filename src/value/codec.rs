//! Value codec
//!
//! Encodes [`Value`]s to stored bytes and back under a [`SerializationMode`].

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use bytes::Bytes;

use super::Value;
use crate::error::{Result, SsdbError};

/// How values are turned into bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SerializationMode {
    /// Raw byte strings only
    #[default]
    None = 0,

    /// Self-describing JSON
    NativeStructured = 1,

    /// bincode
    CompactBinary = 2,
}

impl SerializationMode {
    /// Numeric code used by the option surface
    pub fn code(self) -> i64 {
        self as u8 as i64
    }

    /// Look a mode up by numeric code; unknown codes are rejected
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(SerializationMode::None),
            1 => Ok(SerializationMode::NativeStructured),
            2 => Ok(SerializationMode::CompactBinary),
            _ => Err(SsdbError::Config(format!(
                "unknown serialization mode: {}",
                code
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SerializationMode::None => "none",
            SerializationMode::NativeStructured => "native",
            SerializationMode::CompactBinary => "compact",
        }
    }
}

impl fmt::Display for SerializationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SerializationMode {
    type Err = SsdbError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i64>() {
            return Self::from_code(code);
        }
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(SerializationMode::None),
            "native" | "json" => Ok(SerializationMode::NativeStructured),
            "compact" | "binary" | "bincode" => Ok(SerializationMode::CompactBinary),
            other => Err(SsdbError::Config(format!(
                "unknown serialization mode: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// Process-wide default
// =============================================================================

static DEFAULT_MODE: AtomicU8 = AtomicU8::new(SerializationMode::None as u8);

/// Mode new sessions start with
pub fn default_mode() -> SerializationMode {
    match DEFAULT_MODE.load(Ordering::Relaxed) {
        1 => SerializationMode::NativeStructured,
        2 => SerializationMode::CompactBinary,
        _ => SerializationMode::None,
    }
}

/// Change the mode new sessions start with. Existing sessions keep theirs.
pub fn set_default_mode(mode: SerializationMode) {
    DEFAULT_MODE.store(mode as u8, Ordering::Relaxed);
}

// =============================================================================
// Codec
// =============================================================================

/// Encodes and decodes values under one serialization mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueCodec {
    mode: SerializationMode,
}

impl ValueCodec {
    pub fn new(mode: SerializationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SerializationMode {
        self.mode
    }

    /// Serialize a value to its stored form.
    ///
    /// Under `None` only `Value::Bytes` is accepted.
    pub fn encode(&self, value: &Value) -> Result<Bytes> {
        match self.mode {
            SerializationMode::None => match value {
                Value::Bytes(bytes) => Ok(Bytes::copy_from_slice(bytes)),
                other => Err(SsdbError::Codec(format!(
                    "cannot store a {} value without a serializer",
                    other.kind()
                ))),
            },
            SerializationMode::NativeStructured => serde_json::to_vec(value)
                .map(Bytes::from)
                .map_err(|e| SsdbError::Codec(format!("json encode: {}", e))),
            SerializationMode::CompactBinary => bincode::serialize(value)
                .map(Bytes::from)
                .map_err(|e| SsdbError::Codec(format!("bincode encode: {}", e))),
        }
    }

    /// Inverse of [`encode`](Self::encode) under the same mode.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        match self.mode {
            SerializationMode::None => Ok(Value::Bytes(bytes.to_vec())),
            SerializationMode::NativeStructured => serde_json::from_slice(bytes)
                .map_err(|e| SsdbError::Codec(format!("json decode: {}", e))),
            SerializationMode::CompactBinary => bincode::deserialize(bytes)
                .map_err(|e| SsdbError::Codec(format!("bincode decode: {}", e))),
        }
    }
}
