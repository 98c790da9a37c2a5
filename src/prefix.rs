//! Key prefixing
//!
//! Namespaces a shared keyspace by prepending a fixed prefix to outgoing
//! keys and removing it from keys the server returns.

use std::borrow::Cow;

use bytes::Bytes;

/// Prepends and strips a configured key prefix.
///
/// An empty prefix makes both directions the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPrefixer {
    prefix: Bytes,
}

impl KeyPrefixer {
    pub fn new(prefix: impl AsRef<[u8]>) -> Self {
        Self {
            prefix: Bytes::copy_from_slice(prefix.as_ref()),
        }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Returns `prefix + key`, borrowing `key` when no prefix is set.
    pub fn apply<'k>(&self, key: &'k [u8]) -> Cow<'k, [u8]> {
        if self.prefix.is_empty() {
            return Cow::Borrowed(key);
        }
        let mut out = Vec::with_capacity(self.prefix.len() + key.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(key);
        Cow::Owned(out)
    }

    /// Removes the prefix from the front of `key`.
    ///
    /// Keys that do not carry the prefix come back unchanged.
    pub fn strip<'k>(&self, key: &'k [u8]) -> &'k [u8] {
        if self.prefix.is_empty() {
            return key;
        }
        key.strip_prefix(self.prefix.as_ref()).unwrap_or(key)
    }

    /// Zero-copy variant of [`strip`](Self::strip) for received blocks.
    pub fn strip_bytes(&self, key: &Bytes) -> Bytes {
        if !self.prefix.is_empty() && key.starts_with(&self.prefix) {
            key.slice(self.prefix.len()..)
        } else {
            key.clone()
        }
    }
}
