//! Sorted set verbs
//!
//! Scores are signed 64-bit integers and travel as decimal text, never
//! through the value codec.

use std::borrow::BorrowMut;

use bytes::Bytes;

use super::kv::key_slices;
use super::{non_empty, positive, Client};
use crate::error::{Result, SsdbError};
use crate::network::Session;
use crate::protocol::{BatchItems, BatchSpec, Command};
use crate::value::Value;

impl<S: BorrowMut<Session>> Client<S> {
    pub fn zset(
        &mut self,
        name: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
        score: i64,
    ) -> Result<bool> {
        let command = self
            .member_command("zset", name.as_ref(), member.as_ref())?
            .arg_num(score);
        self.exec(command)?.as_bool()
    }

    /// Score of a member
    pub fn zget(
        &mut self,
        name: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<Option<i64>> {
        let command = self.member_command("zget", name.as_ref(), member.as_ref())?;
        self.exec(command)?.as_number()
    }

    pub fn zdel(&mut self, name: impl AsRef<[u8]>, member: impl AsRef<[u8]>) -> Result<bool> {
        let command = self.member_command("zdel", name.as_ref(), member.as_ref())?;
        self.exec(command)?.as_bool()
    }

    pub fn zexists(&mut self, name: impl AsRef<[u8]>, member: impl AsRef<[u8]>) -> Result<bool> {
        let command = self.member_command("zexists", name.as_ref(), member.as_ref())?;
        self.exec(command)?.as_bool()
    }

    /// Add `by` to a member's score and return the new score
    pub fn zincr(
        &mut self,
        name: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
        by: i64,
    ) -> Result<Option<i64>> {
        let command = self
            .member_command("zincr", name.as_ref(), member.as_ref())?
            .arg_num(by);
        self.exec(command)?.as_number()
    }

    pub fn zsize(&mut self, name: impl AsRef<[u8]>) -> Result<Option<i64>> {
        let name = self.key(name.as_ref())?;
        self.exec(Command::new("zsize").arg_bytes(name))?.as_number()
    }

    /// Remove every member; returns how many were removed
    pub fn zclear(&mut self, name: impl AsRef<[u8]>) -> Result<Option<i64>> {
        let name = self.key(name.as_ref())?;
        self.exec(Command::new("zclear").arg_bytes(name))?.as_number()
    }

    /// Zero-based position of a member in ascending order
    pub fn zrank(
        &mut self,
        name: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<Option<i64>> {
        let command = self.member_command("zrank", name.as_ref(), member.as_ref())?;
        self.exec(command)?.as_number()
    }

    /// Zero-based position of a member in descending order
    pub fn zrrank(
        &mut self,
        name: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<Option<i64>> {
        let command = self.member_command("zrrank", name.as_ref(), member.as_ref())?;
        self.exec(command)?.as_number()
    }

    // =========================================================================
    // Ranges
    // =========================================================================

    /// Sorted set names in `(start, end]`, ascending, prefix stripped
    pub fn zlist(
        &mut self,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<Bytes>> {
        let command = self.range_command("zlist", start.as_ref(), end.as_ref(), limit)?;
        let reply = self.exec(command)?;
        reply.as_list(Some(self.session().prefixer()))
    }

    /// Sorted set names in `(start, end]`, descending, prefix stripped
    pub fn zrlist(
        &mut self,
        start: impl AsRef<[u8]>,
        end: impl AsRef<[u8]>,
        limit: i64,
    ) -> Result<Vec<Bytes>> {
        let command = self.range_command("zrlist", start.as_ref(), end.as_ref(), limit)?;
        let reply = self.exec(command)?;
        reply.as_list(Some(self.session().prefixer()))
    }

    /// Members after `start` whose score lies in `[score_start, score_end]`
    pub fn zkeys(
        &mut self,
        name: impl AsRef<[u8]>,
        start: impl AsRef<[u8]>,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Bytes>> {
        let scores = (score_start, score_end);
        let command =
            self.score_range_command("zkeys", name.as_ref(), start.as_ref(), scores, limit)?;
        self.exec(command)?.as_list(None)
    }

    /// Member/score pairs by ascending score
    pub fn zscan(
        &mut self,
        name: impl AsRef<[u8]>,
        start: impl AsRef<[u8]>,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: i64,
    ) -> Result<Vec<(Bytes, i64)>> {
        let scores = (score_start, score_end);
        let command =
            self.score_range_command("zscan", name.as_ref(), start.as_ref(), scores, limit)?;
        self.exec(command)?.as_score_map(None)
    }

    /// Member/score pairs by descending score
    pub fn zrscan(
        &mut self,
        name: impl AsRef<[u8]>,
        start: impl AsRef<[u8]>,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: i64,
    ) -> Result<Vec<(Bytes, i64)>> {
        let scores = (score_start, score_end);
        let command =
            self.score_range_command("zrscan", name.as_ref(), start.as_ref(), scores, limit)?;
        self.exec(command)?.as_score_map(None)
    }

    /// `limit` member/score pairs from position `offset`, ascending
    pub fn zrange(
        &mut self,
        name: impl AsRef<[u8]>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<(Bytes, i64)>> {
        let command = self.position_command("zrange", name.as_ref(), offset, limit)?;
        self.exec(command)?.as_score_map(None)
    }

    /// `limit` member/score pairs from position `offset`, descending
    pub fn zrrange(
        &mut self,
        name: impl AsRef<[u8]>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<(Bytes, i64)>> {
        let command = self.position_command("zrrange", name.as_ref(), offset, limit)?;
        self.exec(command)?.as_score_map(None)
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Number of members with a score in `[start, end]`
    pub fn zcount(
        &mut self,
        name: impl AsRef<[u8]>,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Option<i64>> {
        let command = self.score_bounds_command("zcount", name.as_ref(), start, end)?;
        self.exec(command)?.as_number()
    }

    /// Sum of scores in `[start, end]`
    pub fn zsum(
        &mut self,
        name: impl AsRef<[u8]>,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Option<i64>> {
        let command = self.score_bounds_command("zsum", name.as_ref(), start, end)?;
        self.exec(command)?.as_number()
    }

    /// Mean of scores in `[start, end]`
    pub fn zavg(
        &mut self,
        name: impl AsRef<[u8]>,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Option<f64>> {
        let command = self.score_bounds_command("zavg", name.as_ref(), start, end)?;
        self.exec(command)?.as_float()
    }

    /// Delete members ranked in `[start, end]`; returns how many were removed
    pub fn zremrangebyrank(
        &mut self,
        name: impl AsRef<[u8]>,
        start: i64,
        end: i64,
    ) -> Result<Option<i64>> {
        let name = self.key(name.as_ref())?;
        let command = Command::new("zremrangebyrank")
            .arg_bytes(name)
            .arg_num(start)
            .arg_num(end);
        self.exec(command)?.as_number()
    }

    /// Delete members scored in `[start, end]`; returns how many were removed
    pub fn zremrangebyscore(
        &mut self,
        name: impl AsRef<[u8]>,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Option<i64>> {
        let command = self.score_bounds_command("zremrangebyscore", name.as_ref(), start, end)?;
        self.exec(command)?.as_number()
    }

    // =========================================================================
    // Batch
    // =========================================================================

    pub fn multi_zset<K: AsRef<[u8]>>(
        &mut self,
        name: impl AsRef<[u8]>,
        members: &[(K, i64)],
    ) -> Result<Option<i64>> {
        let pairs = members
            .iter()
            .map(|(member, score)| {
                Ok((non_empty(member.as_ref(), "member")?, Value::Int(*score)))
            })
            .collect::<Result<Vec<_>>>()?;
        self.batch(&BatchSpec::MULTI_ZSET, Some(name.as_ref()), BatchItems::Pairs(&pairs))?
            .as_number()
    }

    /// Scores of many members; missing members are absent from the result
    pub fn multi_zget<K: AsRef<[u8]>>(
        &mut self,
        name: impl AsRef<[u8]>,
        members: &[K],
    ) -> Result<Vec<(Bytes, i64)>> {
        let members = key_slices(members)?;
        self.batch(&BatchSpec::MULTI_ZGET, Some(name.as_ref()), BatchItems::Keys(&members))?
            .as_score_map(None)
    }

    pub fn multi_zdel<K: AsRef<[u8]>>(
        &mut self,
        name: impl AsRef<[u8]>,
        members: &[K],
    ) -> Result<Option<i64>> {
        let members = key_slices(members)?;
        self.batch(&BatchSpec::MULTI_ZDEL, Some(name.as_ref()), BatchItems::Keys(&members))?
            .as_number()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn member_command(&self, verb: &str, name: &[u8], member: &[u8]) -> Result<Command> {
        let name = self.key(name)?;
        let member = non_empty(member, "member")?;
        Ok(Command::new(verb).arg_bytes(name).arg(member))
    }

    /// `verb name score_start score_end`; a missing bound is sent empty
    fn score_bounds_command(
        &self,
        verb: &str,
        name: &[u8],
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Command> {
        let name = self.key(name)?;
        Ok(Command::new(verb)
            .arg_bytes(name)
            .arg(score_arg(start))
            .arg(score_arg(end)))
    }

    fn score_range_command(
        &self,
        verb: &str,
        name: &[u8],
        start: &[u8],
        (score_start, score_end): (Option<i64>, Option<i64>),
        limit: i64,
    ) -> Result<Command> {
        let name = self.key(name)?;
        let limit = positive(limit, "limit")?;
        Ok(Command::new(verb)
            .arg_bytes(name)
            .arg(start)
            .arg(score_arg(score_start))
            .arg(score_arg(score_end))
            .arg_num(limit))
    }

    fn position_command(
        &self,
        verb: &str,
        name: &[u8],
        offset: i64,
        limit: i64,
    ) -> Result<Command> {
        let name = self.key(name)?;
        if offset < 0 {
            let msg = format!("offset must not be negative, got {}", offset);
            return Err(SsdbError::invalid(msg));
        }
        let limit = positive(limit, "limit")?;
        Ok(Command::new(verb)
            .arg_bytes(name)
            .arg_num(offset)
            .arg_num(limit))
    }
}

fn score_arg(score: Option<i64>) -> String {
    score.map(|s| s.to_string()).unwrap_or_default()
}
