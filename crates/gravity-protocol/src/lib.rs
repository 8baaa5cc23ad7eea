//! Gravity Sync UART Protocol
//!
//! This crate provides the wire-level pieces used to mirror the configuration of
//! an ESP32 running the Gravity firmware. The host sends a single `sync` command
//! over the UART console and the firmware answers with every setting it knows
//! about, packed into parenthesised `(tag:value)` groups and followed by its
//! shell prompt.
//!
//! # Protocol Overview
//!
//! - **Request** (host → firmware): the literal bytes `sync\n`
//! - **Response** (firmware → host): `(tag:value)` groups, optionally surrounded
//!   by echo or banner noise, terminated by the `>` shell prompt
//! - **Error**: the firmware prints `Unrecognized command` when the console was
//!   not ready; the host detects this heuristically and retries
//!
//! ```text
//! (0:1)(4:6)(5:40:91:51:BB:AC:7D)(12:5)(13:-100)>
//! ```
//!
//! # Example
//!
//! ```rust
//! use gravity_protocol::{AccumResult, ResponseAccumulator, Tag, TokenIter};
//!
//! let mut acc = ResponseAccumulator::new();
//! assert_eq!(acc.append(b"(4:6)(5:40:91"), AccumResult::Pending);
//! assert_eq!(acc.append(b":51:BB:AC:7D)>"), AccumResult::Complete);
//!
//! let tags: Vec<_> = TokenIter::new(acc.as_bytes())
//!     .filter_map(|t| t.ok())
//!     .map(|t| t.tag())
//!     .collect();
//! assert_eq!(tags, vec![Some(Tag::Channel), Some(Tag::Mac)]);
//! ```

mod accumulator;
mod error;
mod mac;
mod scanner;
mod tag;

pub use accumulator::*;
pub use error::*;
pub use mac::*;
pub use scanner::*;
pub use tag::*;
