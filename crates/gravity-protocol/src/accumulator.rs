//! Response accumulation across fragmented UART reads.
//!
//! The firmware's answer to `sync` usually arrives in several chunks. Chunks
//! are appended to a bounded buffer and the response is only handed to the
//! scanner once the shell prompt has been seen, so a group split across two
//! reads is always parsed whole.

use bytes::{Bytes, BytesMut};
use log::{trace, warn};

/// Default response buffer capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 256;

/// Shell prompt printed by the firmware once it has finished answering.
pub const COMPLETION_MARKER: u8 = b'>';

/// Last byte of `Unrecognized command`, used to spot a rejected request.
pub const ERROR_MARKER: u8 = b'z';

/// Request sent to the firmware to start a sync.
pub const SYNC_REQUEST: &[u8] = b"sync\n";

/// Outcome of appending a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumResult {
    /// More data is needed.
    Pending,
    /// The prompt has been seen; the buffer holds a full response.
    Complete,
    /// Part of the chunk did not fit and was dropped.
    Overflow,
    /// The firmware rejected the request; clear and ask again.
    ErrorDetected,
}

/// Whether `buffer` contains the completion marker anywhere after its first byte.
///
/// A prompt in the very first position is the tail of the previous command's
/// output, not the end of this response.
pub fn has_completion_marker(buffer: &[u8]) -> bool {
    buffer
        .get(1..)
        .is_some_and(|rest| rest.contains(&COMPLETION_MARKER))
}

/// Whether `buffer` looks like an `Unrecognized command` reply.
///
/// This is a heuristic: any `z` in the response counts.
pub fn is_unrecognized_command(buffer: &[u8]) -> bool {
    buffer.contains(&ERROR_MARKER)
}

/// A bounded buffer collecting one sync response.
#[derive(Debug)]
pub struct ResponseAccumulator {
    /// Bytes retained so far, never longer than `capacity`.
    buffer: BytesMut,
    capacity: usize,
    /// Bytes received for this response, including dropped ones.
    received: usize,
    /// Bytes that did not fit.
    dropped: usize,
    /// A prompt was seen in data that had to be dropped.
    marker_dropped: bool,
}

impl Default for ResponseAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseAccumulator {
    /// Create an accumulator with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an accumulator holding at most `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        ResponseAccumulator {
            buffer: BytesMut::with_capacity(capacity),
            capacity,
            received: 0,
            dropped: 0,
            marker_dropped: false,
        }
    }

    /// Append a received chunk and report the state of the response.
    pub fn append(&mut self, chunk: &[u8]) -> AccumResult {
        let room = self.capacity - self.buffer.len();
        let take = room.min(chunk.len());
        let (kept, rest) = chunk.split_at(take);

        self.buffer.extend_from_slice(kept);

        let overflowed = !rest.is_empty();
        if overflowed {
            let rest_start = self.received + take;
            if let Some(i) = rest.iter().position(|&b| b == COMPLETION_MARKER) {
                if rest_start + i > 0 {
                    self.marker_dropped = true;
                }
            }
            self.dropped += rest.len();
            warn!(
                "sync response exceeds {} bytes, dropped {} bytes ({} total)",
                self.capacity,
                rest.len(),
                self.dropped
            );
        }
        self.received += chunk.len();

        trace!(
            "appended {} bytes, buffered {}/{}",
            take,
            self.buffer.len(),
            self.capacity
        );

        if self.marker_dropped || has_completion_marker(&self.buffer) {
            if is_unrecognized_command(&self.buffer) {
                return AccumResult::ErrorDetected;
            }
            return AccumResult::Complete;
        }

        if overflowed {
            AccumResult::Overflow
        } else {
            AccumResult::Pending
        }
    }

    /// The bytes retained so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Take the retained bytes, leaving the accumulator empty.
    pub fn take(&mut self) -> Bytes {
        let data = self.buffer.split().freeze();
        self.reset_counters();
        data
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Maximum number of bytes retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes dropped for the current response.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Whether nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.reset_counters();
    }

    fn reset_counters(&mut self) {
        self.received = 0;
        self.dropped = 0;
        self.marker_dropped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_in_one_chunk() {
        let mut acc = ResponseAccumulator::new();
        assert_eq!(acc.append(b"(6:5)(7:1)>"), AccumResult::Complete);
        assert_eq!(acc.as_bytes(), b"(6:5)(7:1)>");
    }

    #[test]
    fn test_partial_response() {
        let mut acc = ResponseAccumulator::new();
        assert_eq!(acc.append(b"(6:"), AccumResult::Pending);
        assert_eq!(acc.append(b"5)"), AccumResult::Pending);
        assert_eq!(acc.append(b">"), AccumResult::Complete);
    }

    #[test]
    fn test_leading_prompt_is_not_completion() {
        let mut acc = ResponseAccumulator::new();
        assert_eq!(acc.append(b">"), AccumResult::Pending);
        assert_eq!(acc.append(b"(4:3)"), AccumResult::Pending);
        assert_eq!(acc.append(b"> "), AccumResult::Complete);
    }

    #[test]
    fn test_marker_seen_in_earlier_chunk() {
        let mut acc = ResponseAccumulator::new();
        assert_eq!(acc.append(b"(4:3)>"), AccumResult::Complete);
        // Trailing bytes after the prompt keep the response complete.
        assert_eq!(acc.append(b" "), AccumResult::Complete);
    }

    #[test]
    fn test_unrecognized_command() {
        let mut acc = ResponseAccumulator::new();
        assert_eq!(acc.append(b"Unrecogni"), AccumResult::Pending);
        assert_eq!(acc.append(b"zed command\r\n>"), AccumResult::ErrorDetected);
    }

    #[test]
    fn test_overflow_never_exceeds_capacity() {
        let mut acc = ResponseAccumulator::with_capacity(8);
        assert_eq!(acc.append(b"(1:12)"), AccumResult::Pending);
        assert_eq!(acc.append(b"(2:34)"), AccumResult::Overflow);
        assert_eq!(acc.buffered_len(), 8);
        assert_eq!(acc.dropped(), 4);
        assert_eq!(acc.append(b"(3:5)"), AccumResult::Overflow);
        assert_eq!(acc.buffered_len(), 8);
        assert_eq!(acc.as_bytes(), b"(1:12)(2");
    }

    #[test]
    fn test_prompt_in_dropped_tail_completes() {
        let mut acc = ResponseAccumulator::with_capacity(6);
        assert_eq!(acc.append(b"(1:12)(2:3)>"), AccumResult::Complete);
        assert_eq!(acc.as_bytes(), b"(1:12)");
    }

    #[test]
    fn test_zero_capacity_leading_prompt() {
        let mut acc = ResponseAccumulator::with_capacity(0);
        assert_eq!(acc.append(b">"), AccumResult::Overflow);
        assert_eq!(acc.append(b">"), AccumResult::Complete);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut acc = ResponseAccumulator::with_capacity(4);
        acc.append(b"(1:1)>");
        acc.clear();
        assert!(acc.is_empty());
        assert_eq!(acc.dropped(), 0);
        assert_eq!(acc.append(b"(1:"), AccumResult::Pending);
    }

    #[test]
    fn test_take_drains() {
        let mut acc = ResponseAccumulator::new();
        acc.append(b"(4:3)>");
        let data = acc.take();
        assert_eq!(&data[..], b"(4:3)>");
        assert!(acc.is_empty());
    }
}
