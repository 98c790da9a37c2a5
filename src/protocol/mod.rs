//! Protocol Module
//!
//! Implements the SSDB text-block wire protocol.
//!
//! ## Frame Format
//! A frame is a sequence of blocks followed by one empty line. Requests and
//! replies share the same framing.
//! ```text
//! ┌──────────────┬────┬──────────────────┬────┐
//! │ len (ASCII)  │ \n │  payload (len)   │ \n │   block 1
//! ├──────────────┼────┼──────────────────┼────┤
//! │     ...      │    │       ...        │    │   block N
//! ├──────────────┴────┴──────────────────┴────┤
//! │                    \n                     │   terminator
//! └───────────────────────────────────────────┘
//! ```
//!
//! ### Requests
//! The first block is the verb, the rest are its arguments.
//!
//! ### Replies
//! The first block is a status token, the rest are data blocks.
//! - `ok`
//! - `not_found`
//! - `error`
//! - `fail`
//! - `client_error`

mod codec;
mod command;
mod response;

pub use codec::{encode_frame, parse_blocks, read_frame, write_block, MAX_BLOCK_SIZE};
pub use command::{
    build_batch, encode_batch, encode_command, BatchFlags, BatchItems, BatchSpec, Command,
};
pub use response::{Reply, Status};
