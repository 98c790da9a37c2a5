//! Queue verbs
//!
//! Queue items are stored values and go through the value codec.

use std::borrow::BorrowMut;

use bytes::Bytes;

use super::{positive, Client};
use crate::error::{Result, SsdbError};
use crate::network::Session;
use crate::protocol::{BatchItems, BatchSpec, Command};
use crate::value::Value;

impl<S: BorrowMut<Session>> Client<S> {
    /// Number of items in the queue
    pub fn qsize(&mut self, name: impl AsRef<[u8]>) -> Result<Option<i64>> {
        let name = self.key(name.as_ref())?;
        self.exec(Command::new("qsize").arg_bytes(name))?.as_number()
    }

    /// Remove every item; returns how many were removed
    pub fn qclear(&mut self, name: impl AsRef<[u8]>) -> Result<Option<i64>> {
        let name = self.key(name.as_ref())?;
        self.exec(Command::new("qclear").arg_bytes(name))?.as_number()
    }

    pub fn qfront(&mut self, name: impl AsRef<[u8]>) -> Result<Option<Value>> {
        let name = self.key(name.as_ref())?;
        let reply = self.exec(Command::new("qfront").arg_bytes(name))?;
        reply.as_string(self.session().codec())
    }

    pub fn qback(&mut self, name: impl AsRef<[u8]>) -> Result<Option<Value>> {
        let name = self.key(name.as_ref())?;
        let reply = self.exec(Command::new("qback").arg_bytes(name))?;
        reply.as_string(self.session().codec())
    }

    /// Item at `index`; negative indexes count from the back
    pub fn qget(&mut self, name: impl AsRef<[u8]>, index: i64) -> Result<Option<Value>> {
        let name = self.key(name.as_ref())?;
        let reply = self.exec(Command::new("qget").arg_bytes(name).arg_num(index))?;
        reply.as_string(self.session().codec())
    }

    /// Replace the item at `index`
    pub fn qset(
        &mut self,
        name: impl AsRef<[u8]>,
        index: i64,
        value: impl Into<Value>,
    ) -> Result<bool> {
        let name = self.key(name.as_ref())?;
        let value = self.value(&value.into())?;
        let command = Command::new("qset")
            .arg_bytes(name)
            .arg_num(index)
            .arg_bytes(value);
        self.exec(command)?.as_bool()
    }

    // =========================================================================
    // Ranges
    // =========================================================================

    /// Queue names in `(start, end]`, ascending, prefix stripped
    pub fn qlist(
        &mut self,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<Bytes>> {
        let command = self.range_command("qlist", start.as_ref(), end.as_ref(), limit)?;
        let reply = self.exec(command)?;
        reply.as_list(Some(self.session().prefixer()))
    }

    /// Queue names in `(start, end]`, descending, prefix stripped
    pub fn qrlist(
        &mut self,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<Bytes>> {
        let command = self.range_command("qrlist", start.as_ref(), end.as_ref(), limit)?;
        let reply = self.exec(command)?;
        reply.as_list(Some(self.session().prefixer()))
    }

    /// `limit` items starting at `offset`
    pub fn qrange(
        &mut self,
        name: impl AsRef<[u8]>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Value>> {
        let name = self.key(name.as_ref())?;
        let limit = positive(limit, "limit")?;
        let command = Command::new("qrange")
            .arg_bytes(name)
            .arg_num(offset)
            .arg_num(limit);
        let reply = self.exec(command)?;
        reply.as_value_list(self.session().codec())
    }

    /// Items with index in `[begin, end]`; negative indexes count from the back
    pub fn qslice(
        &mut self,
        name: impl AsRef<[u8]>,
        begin: i64,
        end: i64,
    ) -> Result<Vec<Value>> {
        let name = self.key(name.as_ref())?;
        let command = Command::new("qslice")
            .arg_bytes(name)
            .arg_num(begin)
            .arg_num(end);
        let reply = self.exec(command)?;
        reply.as_value_list(self.session().codec())
    }

    // =========================================================================
    // Push
    // =========================================================================

    /// Append one item; returns the new queue length
    pub fn qpush(
        &mut self,
        name: impl AsRef<[u8]>,
        value: impl Into<Value>,
    ) -> Result<Option<i64>> {
        self.push_one(&BatchSpec::QPUSH, name.as_ref(), value.into())
    }

    pub fn qpush_front(
        &mut self,
        name: impl AsRef<[u8]>,
        value: impl Into<Value>,
    ) -> Result<Option<i64>> {
        self.push_one(&BatchSpec::QPUSH_FRONT, name.as_ref(), value.into())
    }

    pub fn qpush_back(
        &mut self,
        name: impl AsRef<[u8]>,
        value: impl Into<Value>,
    ) -> Result<Option<i64>> {
        self.push_one(&BatchSpec::QPUSH_BACK, name.as_ref(), value.into())
    }

    /// Append many items in one round trip
    pub fn qpush_many<V: Clone + Into<Value>>(
        &mut self,
        name: impl AsRef<[u8]>,
        values: &[V],
    ) -> Result<Option<i64>> {
        self.push_many(&BatchSpec::QPUSH, name.as_ref(), values)
    }

    pub fn qpush_front_many<V: Clone + Into<Value>>(
        &mut self,
        name: impl AsRef<[u8]>,
        values: &[V],
    ) -> Result<Option<i64>> {
        self.push_many(&BatchSpec::QPUSH_FRONT, name.as_ref(), values)
    }

    pub fn qpush_back_many<V: Clone + Into<Value>>(
        &mut self,
        name: impl AsRef<[u8]>,
        values: &[V],
    ) -> Result<Option<i64>> {
        self.push_many(&BatchSpec::QPUSH_BACK, name.as_ref(), values)
    }

    // =========================================================================
    // Pop and trim
    // =========================================================================

    /// Remove and return the front item
    pub fn qpop(&mut self, name: impl AsRef<[u8]>) -> Result<Option<Value>> {
        self.pop_one("qpop", name.as_ref())
    }

    pub fn qpop_front(&mut self, name: impl AsRef<[u8]>) -> Result<Option<Value>> {
        self.pop_one("qpop_front", name.as_ref())
    }

    pub fn qpop_back(&mut self, name: impl AsRef<[u8]>) -> Result<Option<Value>> {
        self.pop_one("qpop_back", name.as_ref())
    }

    /// Remove and return up to `size` items from the front
    pub fn qpop_many(&mut self, name: impl AsRef<[u8]>, size: i64) -> Result<Vec<Value>> {
        self.pop_many("qpop", name.as_ref(), size)
    }

    pub fn qpop_front_many(&mut self, name: impl AsRef<[u8]>, size: i64) -> Result<Vec<Value>> {
        self.pop_many("qpop_front", name.as_ref(), size)
    }

    pub fn qpop_back_many(&mut self, name: impl AsRef<[u8]>, size: i64) -> Result<Vec<Value>> {
        self.pop_many("qpop_back", name.as_ref(), size)
    }

    /// Drop up to `size` items from the front; returns how many were removed
    pub fn qtrim_front(&mut self, name: impl AsRef<[u8]>, size: i64) -> Result<Option<i64>> {
        self.trim("qtrim_front", name.as_ref(), size)
    }

    /// Drop up to `size` items from the back; returns how many were removed
    pub fn qtrim_back(&mut self, name: impl AsRef<[u8]>, size: i64) -> Result<Option<i64>> {
        self.trim("qtrim_back", name.as_ref(), size)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn push_one(&mut self, spec: &BatchSpec, name: &[u8], value: Value) -> Result<Option<i64>> {
        if value.is_empty_bytes() {
            return Err(SsdbError::invalid("value must not be empty"));
        }
        let values = [value];
        self.batch(spec, Some(name), BatchItems::Values(&values))?
            .as_number()
    }

    fn push_many<V: Clone + Into<Value>>(
        &mut self,
        spec: &BatchSpec,
        name: &[u8],
        values: &[V],
    ) -> Result<Option<i64>> {
        let values: Vec<Value> = values.iter().cloned().map(Into::into).collect();
        if values.iter().any(Value::is_empty_bytes) {
            return Err(SsdbError::invalid("value must not be empty"));
        }
        self.batch(spec, Some(name), BatchItems::Values(&values))?
            .as_number()
    }

    fn pop_one(&mut self, verb: &str, name: &[u8]) -> Result<Option<Value>> {
        let name = self.key(name)?;
        let reply = self.exec(Command::new(verb).arg_bytes(name))?;
        reply.as_string(self.session().codec())
    }

    fn pop_many(&mut self, verb: &str, name: &[u8], size: i64) -> Result<Vec<Value>> {
        let name = self.key(name)?;
        let size = positive(size, "size")?;
        let reply = self.exec(Command::new(verb).arg_bytes(name).arg_num(size))?;
        reply.as_value_list(self.session().codec())
    }

    fn trim(&mut self, verb: &str, name: &[u8], size: i64) -> Result<Option<i64>> {
        let name = self.key(name)?;
        let size = positive(size, "size")?;
        self.exec(Command::new(verb).arg_bytes(name).arg_num(size))?
            .as_number()
    }
}
