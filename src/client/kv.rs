//! Key/value verbs

use std::borrow::BorrowMut;

use bytes::Bytes;

use super::{non_empty, positive, Client};
use crate::error::{Result, SsdbError};
use crate::network::Session;
use crate::protocol::{BatchItems, BatchSpec, Command};
use crate::value::Value;

impl<S: BorrowMut<Session>> Client<S> {
    /// Store a value, with an optional time-to-live in seconds (`setx`).
    pub fn set(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl Into<Value>,
        ttl: Option<u64>,
    ) -> Result<bool> {
        let key = self.key(key.as_ref())?;
        let value = self.value(&value.into())?;
        let command = match ttl {
            Some(0) => return Err(SsdbError::invalid("ttl must be positive")),
            Some(ttl) => Command::new("setx").arg_bytes(key).arg_bytes(value).arg_num(ttl),
            None => Command::new("set").arg_bytes(key).arg_bytes(value),
        };
        self.exec(command)?.as_bool()
    }

    /// Store a value only if the key does not exist
    pub fn setnx(&mut self, key: impl AsRef<[u8]>, value: impl Into<Value>) -> Result<bool> {
        let key = self.key(key.as_ref())?;
        let value = self.value(&value.into())?;
        self.exec(Command::new("setnx").arg_bytes(key).arg_bytes(value))?
            .as_bool()
    }

    /// Store a value and return the previous one
    pub fn getset(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        let key = self.key(key.as_ref())?;
        let value = self.value(&value.into())?;
        let reply = self.exec(Command::new("getset").arg_bytes(key).arg_bytes(value))?;
        reply.as_string(self.session().codec())
    }

    pub fn get(&mut self, key: impl AsRef<[u8]>) -> Result<Option<Value>> {
        let key = self.key(key.as_ref())?;
        let reply = self.exec(Command::new("get").arg_bytes(key))?;
        reply.as_string(self.session().codec())
    }

    pub fn del(&mut self, key: impl AsRef<[u8]>) -> Result<bool> {
        let key = self.key(key.as_ref())?;
        self.exec(Command::new("del").arg_bytes(key))?.as_bool()
    }

    pub fn exists(&mut self, key: impl AsRef<[u8]>) -> Result<bool> {
        let key = self.key(key.as_ref())?;
        self.exec(Command::new("exists").arg_bytes(key))?.as_bool()
    }

    pub fn strlen(&mut self, key: impl AsRef<[u8]>) -> Result<Option<i64>> {
        let key = self.key(key.as_ref())?;
        self.exec(Command::new("strlen").arg_bytes(key))?.as_number()
    }

    /// Remaining time-to-live in seconds
    pub fn ttl(&mut self, key: impl AsRef<[u8]>) -> Result<Option<i64>> {
        let key = self.key(key.as_ref())?;
        self.exec(Command::new("ttl").arg_bytes(key))?.as_number()
    }

    /// Add `by` to an integer value and return the result
    pub fn incr(&mut self, key: impl AsRef<[u8]>, by: i64) -> Result<Option<i64>> {
        let key = self.key(key.as_ref())?;
        self.exec(Command::new("incr").arg_bytes(key).arg_num(by))?
            .as_number()
    }

    pub fn expire(&mut self, key: impl AsRef<[u8]>, ttl: u64) -> Result<bool> {
        let key = self.key(key.as_ref())?;
        if ttl == 0 {
            return Err(SsdbError::invalid("ttl must be positive"));
        }
        self.exec(Command::new("expire").arg_bytes(key).arg_num(ttl))?
            .as_bool()
    }

    // =========================================================================
    // Bit and substring access
    // =========================================================================

    pub fn getbit(&mut self, key: impl AsRef<[u8]>, offset: i64) -> Result<Option<i64>> {
        let key = self.key(key.as_ref())?;
        self.exec(Command::new("getbit").arg_bytes(key).arg_num(offset))?
            .as_number()
    }

    /// Set one bit and return its previous value
    pub fn setbit(
        &mut self,
        key: impl AsRef<[u8]>,
        offset: i64,
        bit: bool,
    ) -> Result<Option<i64>> {
        let key = self.key(key.as_ref())?;
        let command = Command::new("setbit")
            .arg_bytes(key)
            .arg_num(offset)
            .arg_num(bit as u8);
        self.exec(command)?.as_number()
    }

    /// Count set bits, optionally within `start` and `size` bytes
    pub fn countbit(
        &mut self,
        key: impl AsRef<[u8]>,
        start: Option<i64>,
        size: Option<i64>,
    ) -> Result<Option<i64>> {
        let key = self.key(key.as_ref())?;
        let command = Command::new("countbit")
            .arg_bytes(key)
            .arg_opt(start.map(|n| n.to_string()))
            .arg_opt(start.and(size).map(|n| n.to_string()));
        self.exec(command)?.as_number()
    }

    /// Raw bytes of a stored value, optionally from `start` for `size` bytes
    pub fn substr(
        &mut self,
        key: impl AsRef<[u8]>,
        start: Option<i64>,
        size: Option<i64>,
    ) -> Result<Option<Bytes>> {
        let key = self.key(key.as_ref())?;
        let command = Command::new("substr")
            .arg_bytes(key)
            .arg_opt(start.map(|n| n.to_string()))
            .arg_opt(start.and(size).map(|n| n.to_string()));
        self.exec(command)?.as_bytes()
    }

    // =========================================================================
    // Ranges
    // =========================================================================

    /// Keys in `(start, end]`, prefix stripped
    pub fn keys(
        &mut self,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<Bytes>> {
        let command = self.range_command("keys", start.as_ref(), end.as_ref(), limit)?;
        let reply = self.exec(command)?;
        reply.as_list(Some(self.session().prefixer()))
    }

    /// Key/value pairs in `(start, end]`, ascending
    pub fn scan(
        &mut self,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<(Bytes, Value)>> {
        let command = self.range_command("scan", start.as_ref(), end.as_ref(), limit)?;
        let reply = self.exec(command)?;
        let session = self.session();
        reply.as_value_map(Some(session.prefixer()), session.codec())
    }

    /// Key/value pairs in `(start, end]`, descending
    pub fn rscan(
        &mut self,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<(Bytes, Value)>> {
        let command = self.range_command("rscan", start.as_ref(), end.as_ref(), limit)?;
        let reply = self.exec(command)?;
        let session = self.session();
        reply.as_value_map(Some(session.prefixer()), session.codec())
    }

    /// `verb start end limit` with both boundaries prefixed
    pub(super) fn range_command(
        &self,
        verb: &str,
        start: &[u8],
        end: &[u8],
        limit: i64,
    ) -> Result<Command> {
        let limit = positive(limit, "limit")?;
        Ok(Command::new(verb)
            .arg_bytes(self.bound(start))
            .arg_bytes(self.bound(end))
            .arg_num(limit))
    }

    // =========================================================================
    // Batch
    // =========================================================================

    /// Store many key/value pairs in one round trip
    pub fn multi_set<K, V>(&mut self, pairs: &[(K, V)]) -> Result<Option<i64>>
    where
        K: AsRef<[u8]>,
        V: Clone + Into<Value>,
    {
        let pairs = value_pairs(pairs)?;
        self.batch(&BatchSpec::MULTI_SET, None, BatchItems::Pairs(&pairs))?
            .as_number()
    }

    /// Fetch many keys; missing keys are absent from the result
    pub fn multi_get<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<Vec<(Bytes, Value)>> {
        let keys = key_slices(keys)?;
        let reply = self.batch(&BatchSpec::MULTI_GET, None, BatchItems::Keys(&keys))?;
        let session = self.session();
        reply.as_value_map(Some(session.prefixer()), session.codec())
    }

    pub fn multi_del<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<Option<i64>> {
        let keys = key_slices(keys)?;
        self.batch(&BatchSpec::MULTI_DEL, None, BatchItems::Keys(&keys))?
            .as_number()
    }
}

/// Borrow each key as a slice, rejecting empty ones
pub(super) fn key_slices<K: AsRef<[u8]>>(keys: &[K]) -> Result<Vec<&[u8]>> {
    keys.iter().map(|k| non_empty(k.as_ref(), "key")).collect()
}

/// Pair each key with its value, rejecting empty keys and values
pub(super) fn value_pairs<K, V>(pairs: &[(K, V)]) -> Result<Vec<(&[u8], Value)>>
where
    K: AsRef<[u8]>,
    V: Clone + Into<Value>,
{
    pairs
        .iter()
        .map(|(k, v)| {
            let value: Value = v.clone().into();
            if value.is_empty_bytes() {
                return Err(SsdbError::invalid("value must not be empty"));
            }
            Ok((non_empty(k.as_ref(), "key")?, value))
        })
        .collect()
}
