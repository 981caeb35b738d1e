//! Error types emitted by bit buffer readers and writers.
//!
//! Every failing operation leaves the buffer and any reader positioned
//! exactly where they were, so callers can retry once more bits arrive.

use thiserror::Error;

/// Errors produced by [`BitBuffer`](crate::bits::BitBuffer) and
/// [`BitReader`](crate::bits::BitReader).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BitError {
    /// Fewer unread bits were available than the operation required.
    #[error("bit buffer exhausted: requested {requested} bits, {available} available")]
    Exhausted { requested: usize, available: usize },
    /// A quantized value fell outside its declared range.
    #[error("value {value} outside quantized range [{min}, {max}]")]
    OutOfRange { value: u64, min: u64, max: u64 },
    /// A string contained a NUL byte and cannot be null-terminated.
    #[error("string contains an interior NUL byte at offset {offset}")]
    InteriorNul { offset: usize },
    /// No NUL terminator has been written after the reader position yet.
    #[error("string terminator not found in {available} unread bits")]
    Unterminated { available: usize },
    /// A null-terminated string did not hold valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    /// A reader was asked to seek beyond the written bits.
    #[error("position {position} beyond {written} written bits")]
    InvalidPosition { position: usize, written: usize },
}
