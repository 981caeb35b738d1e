//! Errors produced while slicing outbound messages into fragments.

use thiserror::Error;

use crate::{
    bits::BitError,
    message::{FragmentIndex, SequenceId},
};

/// Errors returned by
/// [`OutboundMessage::take_fragment`](crate::outbound::OutboundMessage::take_fragment).
///
/// The source message is left untouched when an error is returned.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FragmentationError {
    /// Every payload bit has already been handed out.
    #[error("payload of sequence {sequence_id} is exhausted")]
    PayloadExhausted { sequence_id: SequenceId },
    /// Another fragment would need an index beyond `u16::MAX`.
    #[error("fragment index overflow after {last}")]
    IndexOverflow { last: FragmentIndex },
    /// The payload could not be read at the slicing position.
    #[error("failed to slice payload: {0}")]
    Payload(#[from] BitError),
}
