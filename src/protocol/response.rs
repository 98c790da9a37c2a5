//! Reply decoding
//!
//! A [`Reply`] is a status plus the data blocks that followed it. The
//! projections turn it into the shape a command returns, applying key
//! stripping and value decoding where the caller asks for it.

use std::fmt;

use bytes::Bytes;

use super::codec::parse_blocks;
use crate::error::{Result, SsdbError};
use crate::prefix::KeyPrefixer;
use crate::value::{Value, ValueCodec};

/// Reply status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    NotFound,
    Error,
    Fail,
    /// Also used for any status token the client does not recognise
    ClientError,
}

impl Status {
    /// Map a status block to a status. Matching is exact and case-sensitive.
    pub fn from_token(token: &[u8]) -> Self {
        match token {
            b"ok" => Status::Ok,
            b"not_found" => Status::NotFound,
            b"error" => Status::Error,
            b"fail" => Status::Fail,
            _ => Status::ClientError,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::NotFound => "not_found",
            Status::Error => "error",
            Status::Fail => "fail",
            Status::ClientError => "client_error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded reply frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    status: Status,
    blocks: Vec<Bytes>,
}

impl Reply {
    pub fn new(status: Status, blocks: Vec<Bytes>) -> Self {
        Self { status, blocks }
    }

    /// Decode a complete reply frame.
    pub fn parse(frame: Bytes) -> Result<Self> {
        let mut blocks = parse_blocks(&frame)?.into_iter();
        let status = match blocks.next() {
            Some(token) => Status::from_token(&token),
            None => {
                return Err(SsdbError::Protocol(
                    "reply has no status block".to_string(),
                ))
            }
        };
        Ok(Self {
            status,
            blocks: blocks.collect(),
        })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Data blocks after the status, in wire order
    pub fn blocks(&self) -> &[Bytes] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Bytes> {
        self.blocks
    }

    // =========================================================================
    // Projections
    // =========================================================================

    /// `ok` → first block is non-zero, `not_found` → false.
    pub fn as_bool(&self) -> Result<bool> {
        self.check()?;
        if self.status == Status::NotFound {
            return Ok(false);
        }
        Ok(match self.blocks.first() {
            None => true,
            Some(block) => match parse_int(block) {
                Ok(n) => n != 0,
                Err(_) => true,
            },
        })
    }

    /// `ok` → first block as an integer, `not_found` → `None`.
    pub fn as_number(&self) -> Result<Option<i64>> {
        match self.first_block()? {
            Some(block) => parse_int(block).map(Some),
            None => Ok(None),
        }
    }

    /// `ok` → first block as a float, `not_found` → `None`.
    pub fn as_float(&self) -> Result<Option<f64>> {
        match self.first_block()? {
            Some(block) => parse_float(block).map(Some),
            None => Ok(None),
        }
    }

    /// `ok` → first block as-is, `not_found` → `None`.
    pub fn as_bytes(&self) -> Result<Option<Bytes>> {
        Ok(self.first_block()?.cloned())
    }

    /// `ok` → first block decoded through `codec`, `not_found` → `None`.
    pub fn as_string(&self, codec: &ValueCodec) -> Result<Option<Value>> {
        match self.first_block()? {
            Some(block) => codec.decode(block).map(Some),
            None => Ok(None),
        }
    }

    /// Every block in wire order, optionally prefix-stripped.
    pub fn as_list(&self, strip: Option<&KeyPrefixer>) -> Result<Vec<Bytes>> {
        if !self.has_data()? {
            return Ok(Vec::new());
        }
        Ok(self
            .blocks
            .iter()
            .map(|block| strip_key(strip, block))
            .collect())
    }

    /// Every block in wire order, decoded through `codec`.
    pub fn as_value_list(&self, codec: &ValueCodec) -> Result<Vec<Value>> {
        if !self.has_data()? {
            return Ok(Vec::new());
        }
        self.blocks.iter().map(|block| codec.decode(block)).collect()
    }

    /// Consecutive `(key, value)` pairs in wire order.
    pub fn as_map(&self, strip: Option<&KeyPrefixer>) -> Result<Vec<(Bytes, Bytes)>> {
        self.pairs(strip, |block| Ok(block.clone()))
    }

    /// Like [`as_map`](Self::as_map) with values decoded through `codec`.
    pub fn as_value_map(
        &self,
        strip: Option<&KeyPrefixer>,
        codec: &ValueCodec,
    ) -> Result<Vec<(Bytes, Value)>> {
        self.pairs(strip, |block| codec.decode(block))
    }

    /// Like [`as_map`](Self::as_map) with values parsed as integer scores.
    pub fn as_score_map(&self, strip: Option<&KeyPrefixer>) -> Result<Vec<(Bytes, i64)>> {
        self.pairs(strip, parse_int)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Turn `error`, `fail` and unknown statuses into an error.
    fn check(&self) -> Result<()> {
        match self.status {
            Status::Ok | Status::NotFound => Ok(()),
            status => Err(SsdbError::Server {
                status,
                message: self.message(),
            }),
        }
    }

    /// Server-supplied message, or the status token when there is none
    fn message(&self) -> String {
        match self.blocks.first() {
            Some(block) => String::from_utf8_lossy(block).into_owned(),
            None => self.status.as_str().to_string(),
        }
    }

    /// False for `not_found`; errors for failure statuses.
    fn has_data(&self) -> Result<bool> {
        self.check()?;
        Ok(self.status == Status::Ok)
    }

    /// First data block of an `ok` reply, `None` for `not_found`.
    fn first_block(&self) -> Result<Option<&Bytes>> {
        if !self.has_data()? {
            return Ok(None);
        }
        match self.blocks.first() {
            Some(block) => Ok(Some(block)),
            None => Err(SsdbError::Protocol(
                "ok reply is missing its data block".to_string(),
            )),
        }
    }

    fn pairs<V>(
        &self,
        strip: Option<&KeyPrefixer>,
        mut value: impl FnMut(&Bytes) -> Result<V>,
    ) -> Result<Vec<(Bytes, V)>> {
        if !self.has_data()? {
            return Ok(Vec::new());
        }
        if self.blocks.len() % 2 != 0 {
            return Err(SsdbError::Protocol(format!(
                "map reply has an odd number of blocks ({})",
                self.blocks.len()
            )));
        }
        self.blocks
            .chunks_exact(2)
            .map(|pair| Ok((strip_key(strip, &pair[0]), value(&pair[1])?)))
            .collect()
    }
}

fn strip_key(strip: Option<&KeyPrefixer>, key: &Bytes) -> Bytes {
    match strip {
        Some(prefixer) => prefixer.strip_bytes(key),
        None => key.clone(),
    }
}

fn parse_int(block: &Bytes) -> Result<i64> {
    std::str::from_utf8(block)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| {
            SsdbError::Protocol(format!(
                "expected an integer, got {:?}",
                String::from_utf8_lossy(block)
            ))
        })
}

fn parse_float(block: &Bytes) -> Result<f64> {
    std::str::from_utf8(block)
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .ok_or_else(|| {
            SsdbError::Protocol(format!(
                "expected a number, got {:?}",
                String::from_utf8_lossy(block)
            ))
        })
}
