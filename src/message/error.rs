//! Errors surfaced by the message wire codec.

use thiserror::Error;

use super::SequenceId;
use crate::bits::BitError;

/// Errors produced while encoding a [`Message`](crate::message::Message).
///
/// Encoding validates every field first, so an error means nothing was
/// written to the output buffer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The payload cannot be described by the length field.
    #[error("payload of {bits} bits exceeds the {max}-bit limit")]
    PayloadTooLarge { bits: usize, max: usize },
    /// Fragment metadata is only carried alongside a payload.
    #[error("fragment of sequence {sequence_id} carries no payload")]
    EmptyFragment { sequence_id: SequenceId },
    /// A header field fell outside its quantized range.
    #[error("header field out of range: {0}")]
    Field(#[from] BitError),
}

/// Errors produced while decoding a [`Message`](crate::message::Message).
///
/// Truncated input is not an error: the decoder reports it as `Ok(None)` so
/// the caller can retry once more bits arrive.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A header field decoded to a value outside its range.
    #[error("malformed message header at bit {position}: {source}")]
    Malformed {
        position: usize,
        #[source]
        source: BitError,
    },
}
