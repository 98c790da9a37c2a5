//! Hash verbs
//!
//! The hash name is prefixed; field names are sent and returned as-is.

use std::borrow::BorrowMut;

use bytes::Bytes;

use super::kv::{key_slices, value_pairs};
use super::{non_empty, positive, Client};
use crate::error::Result;
use crate::network::Session;
use crate::protocol::{BatchItems, BatchSpec, Command};
use crate::value::Value;

impl<S: BorrowMut<Session>> Client<S> {
    pub fn hset(
        &mut self,
        name: impl AsRef<[u8]>,
        field: impl AsRef<[u8]>,
        value: impl Into<Value>,
    ) -> Result<bool> {
        let name = self.key(name.as_ref())?;
        let field = non_empty(field.as_ref(), "field")?;
        let value = self.value(&value.into())?;
        let command = Command::new("hset")
            .arg_bytes(name)
            .arg(field)
            .arg_bytes(value);
        self.exec(command)?.as_bool()
    }

    pub fn hget(
        &mut self,
        name: impl AsRef<[u8]>,
        field: impl AsRef<[u8]>,
    ) -> Result<Option<Value>> {
        let command = self.field_command("hget", name.as_ref(), field.as_ref())?;
        let reply = self.exec(command)?;
        reply.as_string(self.session().codec())
    }

    pub fn hdel(&mut self, name: impl AsRef<[u8]>, field: impl AsRef<[u8]>) -> Result<bool> {
        let command = self.field_command("hdel", name.as_ref(), field.as_ref())?;
        self.exec(command)?.as_bool()
    }

    pub fn hexists(&mut self, name: impl AsRef<[u8]>, field: impl AsRef<[u8]>) -> Result<bool> {
        let command = self.field_command("hexists", name.as_ref(), field.as_ref())?;
        self.exec(command)?.as_bool()
    }

    /// Add `by` to an integer field and return the result
    pub fn hincr(
        &mut self,
        name: impl AsRef<[u8]>,
        field: impl AsRef<[u8]>,
        by: i64,
    ) -> Result<Option<i64>> {
        let command = self
            .field_command("hincr", name.as_ref(), field.as_ref())?
            .arg_num(by);
        self.exec(command)?.as_number()
    }

    /// Number of fields in the hash
    pub fn hsize(&mut self, name: impl AsRef<[u8]>) -> Result<Option<i64>> {
        let name = self.key(name.as_ref())?;
        self.exec(Command::new("hsize").arg_bytes(name))?.as_number()
    }

    /// Delete every field; returns how many were removed
    pub fn hclear(&mut self, name: impl AsRef<[u8]>) -> Result<Option<i64>> {
        let name = self.key(name.as_ref())?;
        self.exec(Command::new("hclear").arg_bytes(name))?.as_number()
    }

    pub fn hgetall(&mut self, name: impl AsRef<[u8]>) -> Result<Vec<(Bytes, Value)>> {
        let name = self.key(name.as_ref())?;
        let reply = self.exec(Command::new("hgetall").arg_bytes(name))?;
        reply.as_value_map(None, self.session().codec())
    }

    // =========================================================================
    // Ranges
    // =========================================================================

    /// Hash names in `(start, end]`, ascending, prefix stripped
    pub fn hlist(
        &mut self,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<Bytes>> {
        let command = self.range_command("hlist", start.as_ref(), end.as_ref(), limit)?;
        let reply = self.exec(command)?;
        reply.as_list(Some(self.session().prefixer()))
    }

    /// Hash names in `(start, end]`, descending, prefix stripped
    pub fn hrlist(
        &mut self,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<Bytes>> {
        let command = self.range_command("hrlist", start.as_ref(), end.as_ref(), limit)?;
        let reply = self.exec(command)?;
        reply.as_list(Some(self.session().prefixer()))
    }

    /// Field names in `(start, end]`
    pub fn hkeys(
        &mut self,
        name: impl AsRef<[u8]>,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<Bytes>> {
        let command =
            self.field_range_command("hkeys", name.as_ref(), start.as_ref(), end.as_ref(), limit)?;
        self.exec(command)?.as_list(None)
    }

    /// Field/value pairs in `(start, end]`, ascending
    pub fn hscan(
        &mut self,
        name: impl AsRef<[u8]>,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<(Bytes, Value)>> {
        let command =
            self.field_range_command("hscan", name.as_ref(), start.as_ref(), end.as_ref(), limit)?;
        let reply = self.exec(command)?;
        reply.as_value_map(None, self.session().codec())
    }

    /// Field/value pairs in `(start, end]`, descending
    pub fn hrscan(
        &mut self,
        name: impl AsRef<[u8]>,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<(Bytes, Value)>> {
        let command =
            self.field_range_command("hrscan", name.as_ref(), start.as_ref(), end.as_ref(), limit)?;
        let reply = self.exec(command)?;
        reply.as_value_map(None, self.session().codec())
    }

    // =========================================================================
    // Batch
    // =========================================================================

    pub fn multi_hset<K, V>(
        &mut self,
        name: impl AsRef<[u8]>,
        pairs: &[(K, V)],
    ) -> Result<Option<i64>>
    where
        K: AsRef<[u8]>,
        V: Clone + Into<Value>,
    {
        let pairs = value_pairs(pairs)?;
        self.batch(&BatchSpec::MULTI_HSET, Some(name.as_ref()), BatchItems::Pairs(&pairs))?
            .as_number()
    }

    pub fn multi_hget<K: AsRef<[u8]>>(
        &mut self,
        name: impl AsRef<[u8]>,
        fields: &[K],
    ) -> Result<Vec<(Bytes, Value)>> {
        let fields = key_slices(fields)?;
        let reply =
            self.batch(&BatchSpec::MULTI_HGET, Some(name.as_ref()), BatchItems::Keys(&fields))?;
        reply.as_value_map(None, self.session().codec())
    }

    pub fn multi_hdel<K: AsRef<[u8]>>(
        &mut self,
        name: impl AsRef<[u8]>,
        fields: &[K],
    ) -> Result<Option<i64>> {
        let fields = key_slices(fields)?;
        self.batch(&BatchSpec::MULTI_HDEL, Some(name.as_ref()), BatchItems::Keys(&fields))?
            .as_number()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// `verb name field` with only the name prefixed
    fn field_command(&self, verb: &str, name: &[u8], field: &[u8]) -> Result<Command> {
        let name = self.key(name)?;
        let field = non_empty(field, "field")?;
        Ok(Command::new(verb).arg_bytes(name).arg(field))
    }

    /// `verb name start end limit`; boundaries are inner names, not prefixed
    pub(super) fn field_range_command(
        &self,
        verb: &str,
        name: &[u8],
        start: &[u8],
        end: &[u8],
        limit: i64,
    ) -> Result<Command> {
        let name = self.key(name)?;
        let limit = positive(limit, "limit")?;
        Ok(Command::new(verb)
            .arg_bytes(name)
            .arg(start)
            .arg(end)
            .arg_num(limit))
    }
}
