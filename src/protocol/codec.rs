//! Block framing
//!
//! Low-level encoding and parsing of length-prefixed blocks.
//!
//! ## Block Format
//! ```text
//! <decimal length>\n<payload>\n
//! ```
//! A frame ends with an empty line. Parsing tolerates `\r\n` line endings;
//! encoding always emits `\n`.

use std::io::{self, BufRead};

use bytes::{Bytes, BytesMut};

use crate::error::{IoError, Result, SsdbError};

/// Maximum payload size of a single block (256 MB)
pub const MAX_BLOCK_SIZE: usize = 256 * 1024 * 1024;

// =============================================================================
// Encoding
// =============================================================================

/// Append one block to `out`
pub fn write_block(out: &mut BytesMut, payload: &[u8]) {
    out.extend_from_slice(payload.len().to_string().as_bytes());
    out.extend_from_slice(b"\n");
    out.extend_from_slice(payload);
    out.extend_from_slice(b"\n");
}

/// Encode a complete frame from its blocks, terminator included.
///
/// Emits a bare heartbeat when `blocks` is empty; callers that send real
/// commands go through [`encode_command`](super::encode_command), which
/// refuses that case.
pub fn encode_frame<B: AsRef<[u8]>>(blocks: &[B]) -> Bytes {
    let size: usize = blocks
        .iter()
        .map(|b| b.as_ref().len() + 12)
        .sum::<usize>()
        + 1;
    let mut out = BytesMut::with_capacity(size);
    for block in blocks {
        write_block(&mut out, block.as_ref());
    }
    out.extend_from_slice(b"\n");
    out.freeze()
}

// =============================================================================
// Parsing
// =============================================================================

/// Split a complete frame into its blocks.
///
/// Blocks are zero-copy slices of `frame`. The frame must end exactly at
/// its terminating empty line.
pub fn parse_blocks(frame: &Bytes) -> Result<Vec<Bytes>> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    loop {
        let newline = match frame[pos..].iter().position(|&b| b == b'\n') {
            Some(offset) => pos + offset,
            None => {
                return Err(SsdbError::Protocol(
                    "incomplete frame: missing terminator".to_string(),
                ))
            }
        };
        let line = trim_cr(&frame[pos..newline]);

        if line.is_empty() {
            if newline + 1 != frame.len() {
                return Err(SsdbError::Protocol(format!(
                    "{} trailing bytes after frame terminator",
                    frame.len() - newline - 1
                )));
            }
            return Ok(blocks);
        }

        let len = parse_len(line)?;
        let start = newline + 1;
        let end = start + len;
        if end >= frame.len() {
            return Err(SsdbError::Protocol(format!(
                "incomplete block: expected {} bytes, got {}",
                len,
                frame.len().saturating_sub(start)
            )));
        }

        blocks.push(frame.slice(start..end));
        pos = end + block_trailer_len(&frame[end..])?;
    }
}

/// Read one complete frame from a stream.
///
/// Blocks until the terminating empty line arrives. The returned bytes are
/// exactly what was received and can be handed to [`parse_blocks`].
///
/// A timeout before the first byte is reported as `IoError::Timeout` and
/// nothing has been consumed. A timeout after part of the frame was read
/// leaves the stream mid-frame, so it is reported as `IoError::Fatal`.
pub fn read_frame<R: BufRead>(reader: &mut R) -> Result<Bytes> {
    let mut frame = BytesMut::with_capacity(256);
    let mut line = Vec::with_capacity(32);

    match read_frame_into(reader, &mut frame, &mut line) {
        Ok(()) => Ok(frame.freeze()),
        Err(SsdbError::Io(IoError::Timeout)) if !frame.is_empty() || !line.is_empty() => {
            let consumed = frame.len() + line.len();
            Err(SsdbError::Io(IoError::Fatal(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("read timed out after {} bytes of a reply frame", consumed),
            ))))
        }
        Err(e) => Err(e),
    }
}

fn read_frame_into<R: BufRead>(
    reader: &mut R,
    frame: &mut BytesMut,
    line: &mut Vec<u8>,
) -> Result<()> {
    loop {
        read_line(reader, line)?;
        frame.extend_from_slice(line);

        let header = trim_cr(trim_lf(line));
        if header.is_empty() {
            return Ok(());
        }

        let len = parse_len(header)?;
        let start = frame.len();
        frame.resize(start + len, 0);
        line.clear();
        reader.read_exact(&mut frame[start..])?;

        read_line(reader, line)?;
        if !trim_cr(trim_lf(line)).is_empty() {
            return Err(SsdbError::Protocol(format!(
                "block of {} bytes not followed by a line break",
                len
            )));
        }
        frame.extend_from_slice(line);
    }
}

/// Read up to and including the next `\n`; EOF before it is fatal.
fn read_line<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> Result<()> {
    line.clear();
    let n = reader.read_until(b'\n', line)?;
    if n == 0 || line.last() != Some(&b'\n') {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed mid-frame",
        )
        .into());
    }
    Ok(())
}

fn parse_len(line: &[u8]) -> Result<usize> {
    let len = std::str::from_utf8(line)
        .ok()
        .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| {
            SsdbError::Protocol(format!(
                "bad block length: {:?}",
                String::from_utf8_lossy(line)
            ))
        })?;
    if len > MAX_BLOCK_SIZE {
        return Err(SsdbError::Protocol(format!(
            "block too large: {} bytes (max {})",
            len, MAX_BLOCK_SIZE
        )));
    }
    Ok(len)
}

/// Length of the line break that must follow a block payload
fn block_trailer_len(rest: &[u8]) -> Result<usize> {
    match rest {
        [b'\n', ..] => Ok(1),
        [b'\r', b'\n', ..] => Ok(2),
        _ => Err(SsdbError::Protocol(
            "block payload not followed by a line break".to_string(),
        )),
    }
}

fn trim_lf(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\n").unwrap_or(line)
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
