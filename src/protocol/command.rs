//! Command encoding
//!
//! Builds request frames from a verb and its ordered arguments, including
//! the flattened batch form used by the `multi_*` and bulk push verbs.

use std::fmt::Display;

use bytes::Bytes;

use super::codec::encode_frame;
use crate::error::{Result, SsdbError};
use crate::prefix::KeyPrefixer;
use crate::value::{Value, ValueCodec};

/// A request: verb plus ordered arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: String,
    args: Vec<Bytes>,
}

impl Command {
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl AsRef<[u8]>) -> Self {
        self.args.push(Bytes::copy_from_slice(arg.as_ref()));
        self
    }

    /// Append an already-owned argument without copying
    pub fn arg_bytes(mut self, arg: Bytes) -> Self {
        self.args.push(arg);
        self
    }

    /// Append an argument only when present
    pub fn arg_opt(self, arg: Option<impl AsRef<[u8]>>) -> Self {
        match arg {
            Some(arg) => self.arg(arg),
            None => self,
        }
    }

    /// Append a number in decimal form
    pub fn arg_num(self, n: impl Display) -> Self {
        self.arg(n.to_string())
    }

    pub fn push(&mut self, arg: Bytes) {
        self.args.push(arg);
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// Encode to a wire frame
    pub fn encode(&self) -> Result<Bytes> {
        encode_command(&self.verb, &self.args)
    }
}

/// Encode `verb` followed by `args` as one request frame.
///
/// A command without arguments is rejected rather than sent.
pub fn encode_command<A: AsRef<[u8]>>(verb: &str, args: &[A]) -> Result<Bytes> {
    if verb.is_empty() {
        return Err(SsdbError::invalid("command verb is empty"));
    }
    if args.is_empty() {
        return Err(SsdbError::invalid(format!("{}: no arguments", verb)));
    }

    let mut blocks: Vec<&[u8]> = Vec::with_capacity(args.len() + 1);
    blocks.push(verb.as_bytes());
    blocks.extend(args.iter().map(|a| a.as_ref()));
    Ok(encode_frame(&blocks))
}

// =============================================================================
// Batch commands
// =============================================================================

/// Per-verb policy for batch argument construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchFlags {
    /// Prefix each item key
    pub prefix_keys: bool,
    /// Prefix the fixed leading key (hash, zset or queue name)
    pub prefix_leading_key: bool,
    /// Run values through the value codec; otherwise send them as text
    pub encode_values: bool,
}

/// A batch verb and its flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSpec {
    pub verb: &'static str,
    pub flags: BatchFlags,
}

const fn spec(
    verb: &'static str,
    prefix_keys: bool,
    prefix_leading_key: bool,
    encode_values: bool,
) -> BatchSpec {
    BatchSpec {
        verb,
        flags: BatchFlags {
            prefix_keys,
            prefix_leading_key,
            encode_values,
        },
    }
}

impl BatchSpec {
    pub const MULTI_SET: BatchSpec = spec("multi_set", true, false, true);
    pub const MULTI_GET: BatchSpec = spec("multi_get", true, false, false);
    pub const MULTI_DEL: BatchSpec = spec("multi_del", true, false, false);

    pub const MULTI_HSET: BatchSpec = spec("multi_hset", false, true, true);
    pub const MULTI_HGET: BatchSpec = spec("multi_hget", false, true, false);
    pub const MULTI_HDEL: BatchSpec = spec("multi_hdel", false, true, false);

    pub const MULTI_ZSET: BatchSpec = spec("multi_zset", false, true, false);
    pub const MULTI_ZGET: BatchSpec = spec("multi_zget", false, true, false);
    pub const MULTI_ZDEL: BatchSpec = spec("multi_zdel", false, true, false);

    pub const QPUSH: BatchSpec = spec("qpush", false, true, true);
    pub const QPUSH_FRONT: BatchSpec = spec("qpush_front", false, true, true);
    pub const QPUSH_BACK: BatchSpec = spec("qpush_back", false, true, true);
}

/// Items flattened into the tail of a batch command
#[derive(Debug, Clone, Copy)]
pub enum BatchItems<'a> {
    Keys(&'a [&'a [u8]]),
    Values(&'a [Value]),
    /// Emitted as `key, value, key, value, ...`
    Pairs(&'a [(&'a [u8], Value)]),
}

impl BatchItems<'_> {
    pub fn len(&self) -> usize {
        match self {
            BatchItems::Keys(keys) => keys.len(),
            BatchItems::Values(values) => values.len(),
            BatchItems::Pairs(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build a batch command, applying the prefixer and codec per `spec.flags`.
pub fn build_batch(
    spec: &BatchSpec,
    leading_key: Option<&[u8]>,
    items: BatchItems<'_>,
    prefixer: &KeyPrefixer,
    codec: &ValueCodec,
) -> Result<Command> {
    let flags = spec.flags;
    let mut cmd = Command::new(spec.verb);

    if let Some(key) = leading_key {
        cmd.push(key_arg(prefixer, key, flags.prefix_leading_key));
    }

    let value_arg = |value: &Value| -> Result<Bytes> {
        if flags.encode_values {
            codec.encode(value)
        } else {
            raw_value(value)
        }
    };

    match items {
        BatchItems::Keys(keys) => {
            for key in keys {
                cmd.push(key_arg(prefixer, key, flags.prefix_keys));
            }
        }
        BatchItems::Values(values) => {
            for value in values {
                cmd.push(value_arg(value)?);
            }
        }
        BatchItems::Pairs(pairs) => {
            for (key, value) in pairs {
                cmd.push(key_arg(prefixer, key, flags.prefix_keys));
                cmd.push(value_arg(value)?);
            }
        }
    }

    if cmd.args().is_empty() {
        return Err(SsdbError::invalid(format!("{}: no arguments", spec.verb)));
    }
    Ok(cmd)
}

/// Encode a batch command straight to a wire frame.
pub fn encode_batch(
    spec: &BatchSpec,
    leading_key: Option<&[u8]>,
    items: BatchItems<'_>,
    prefixer: &KeyPrefixer,
    codec: &ValueCodec,
) -> Result<Bytes> {
    build_batch(spec, leading_key, items, prefixer, codec)?.encode()
}

fn key_arg(prefixer: &KeyPrefixer, key: &[u8], prefixed: bool) -> Bytes {
    if prefixed {
        Bytes::from(prefixer.apply(key).into_owned())
    } else {
        Bytes::copy_from_slice(key)
    }
}

/// Text form of a value that bypasses the codec (scores)
fn raw_value(value: &Value) -> Result<Bytes> {
    match value {
        Value::Bytes(bytes) => Ok(Bytes::copy_from_slice(bytes)),
        Value::Int(n) => Ok(Bytes::from(n.to_string())),
        Value::Float(f) if f.is_finite() => Ok(Bytes::from(f.to_string())),
        other => Err(SsdbError::invalid(format!(
            "a {} value cannot be sent unencoded",
            other.kind()
        ))),
    }
}
